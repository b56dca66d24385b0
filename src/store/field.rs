use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Editable fields of a step. `type` is absent: it is always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepField {
    Name,
    Sequence,
    DeviceModelId,
    DeviceFunctionId,
    Parameters,
    MaxRetries,
    CallbackWorkflowId,
    CallbackStepCode,
}

/// Editable top-level fields of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowField {
    Name,
    Description,
    #[serde(rename = "type")]
    Kind,
    ProductId,
    KioskVersionId,
}

/// Editable fields of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionField {
    Name,
    Description,
    LeftType,
    LeftValue,
    Operator,
    RightType,
    RightValue,
}

/// Implements the wire key / `FromStr` pair for a field enum.
macro_rules! field_keys {
    ($name:ident { $( $variant:ident => $key:literal ),* $(,)? }) => {
        impl $name {
            /// The key used in field paths and on the wire.
            pub fn key(&self) -> &'static str {
                match self {
                    $( $name::$variant => $key, )*
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $key => Ok($name::$variant), )*
                    _ => Err(format!("unknown {} '{}'", stringify!($name), s)),
                }
            }
        }
    };
}

field_keys!(StepField {
    Name => "name",
    Sequence => "sequence",
    DeviceModelId => "deviceModelId",
    DeviceFunctionId => "deviceFunctionId",
    Parameters => "parameters",
    MaxRetries => "maxRetries",
    CallbackWorkflowId => "callbackWorkflowId",
    CallbackStepCode => "callbackStepCode",
});

field_keys!(WorkflowField {
    Name => "name",
    Description => "description",
    Kind => "type",
    ProductId => "productId",
    KioskVersionId => "kioskVersionId",
});

field_keys!(ConditionField {
    Name => "name",
    Description => "description",
    LeftType => "expression.left.type",
    LeftValue => "expression.left.value",
    Operator => "expression.operator",
    RightType => "expression.right.type",
    RightValue => "expression.right.value",
});

/// Reads an integer the way a form input would: numbers are truncated, numeric strings
/// are parsed, anything else yields `None`.
pub(crate) fn coerce_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Clamps to `min..=u32::MAX`, with `fallback` for unreadable input.
pub(crate) fn coerce_bounded(value: &JsonValue, min: u32, fallback: u32) -> u32 {
    coerce_integer(value)
        .map(|n| n.clamp(min as i64, u32::MAX as i64) as u32)
        .unwrap_or(fallback)
}

pub(crate) fn coerce_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like [`coerce_string`], but blank input becomes `None`.
pub(crate) fn coerce_optional_string(value: &JsonValue) -> Option<String> {
    let s = coerce_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Parses a serde-enumerated value from a JSON string, `None` for blank or unknown input.
pub(crate) fn coerce_enum<T: for<'de> Deserialize<'de>>(value: &JsonValue) -> Option<T> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}
