use super::Condition;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a step within its workflow. Graph nodes are keyed by it,
/// never by list position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepCode(String);

impl StepCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for StepCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StepCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for StepCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// One unit of a workflow, bound to a device function.
///
/// Empty strings in the device bindings mean "not selected yet". `function_type` is
/// derived from `device_function_id` and the device catalog; it is never set directly
/// by the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step {
    pub step_code: StepCode,
    pub name: String,
    /// Depth level. Steps sharing a value run in parallel.
    pub sequence: u32,
    #[serde(rename = "type")]
    pub function_type: String,
    pub device_model_id: String,
    pub device_function_id: String,
    /// Function arguments; `None` once the bound function is invalidated.
    pub parameters: Option<serde_json::Value>,
    pub max_retries: u32,
    pub callback_workflow_id: Option<String>,
    pub callback_step_code: Option<StepCode>,
    pub conditions: Vec<Condition>,
}

impl Step {
    pub fn new(step_code: StepCode, sequence: u32) -> Self {
        Self {
            step_code,
            sequence,
            ..Default::default()
        }
    }

    pub fn calls_back_to(&self, code: &StepCode) -> bool {
        self.callback_step_code.as_ref() == Some(code)
    }
}
