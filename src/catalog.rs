use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A function exposed by a device model.
///
/// Older records carry no `id`; those are matched by `name` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFunction {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub parameter_schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub functions: Vec<DeviceFunction>,
}

/// Read access to the functions of a device model, as already fetched by the caller.
pub trait FunctionCatalog: Send + Sync {
    /// The ordered functions of `model_id`, or `None` if the model is not loaded.
    fn functions(&self, model_id: &str) -> Option<&[DeviceFunction]>;

    /// Resolves a function reference by id first, then by name.
    fn find_function(&self, model_id: &str, function_ref: &str) -> Option<&DeviceFunction> {
        let functions = self.functions(model_id)?;
        functions
            .iter()
            .find(|f| f.id.as_deref() == Some(function_ref))
            .or_else(|| functions.iter().find(|f| f.name == function_ref))
    }
}

/// An in-memory snapshot of device models keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    models: AHashMap<String, DeviceModel>,
}

impl DeviceCatalog {
    pub fn new(models: impl IntoIterator<Item = DeviceModel>) -> Self {
        Self {
            models: models.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn insert(&mut self, model: DeviceModel) {
        self.models.insert(model.id.clone(), model);
    }

    pub fn model(&self, model_id: &str) -> Option<&DeviceModel> {
        self.models.get(model_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FunctionCatalog for DeviceCatalog {
    fn functions(&self, model_id: &str) -> Option<&[DeviceFunction]> {
        self.models.get(model_id).map(|m| m.functions.as_slice())
    }
}
