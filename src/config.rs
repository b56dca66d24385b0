use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Coordinates used when laying out derived graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Distance between neighbouring nodes of the same level.
    pub horizontal_spacing: f64,
    /// Distance between consecutive levels.
    pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            horizontal_spacing: 250.0,
            vertical_spacing: 150.0,
        }
    }
}

/// Bounds applied by the standard validation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaConfig {
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub step_name_max_len: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name_min_len: 3,
            name_max_len: 100,
            step_name_max_len: 100,
        }
    }
}

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub schema: SchemaConfig,
    /// Length of generated step codes.
    pub step_code_length: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            schema: SchemaConfig::default(),
            step_code_length: 8,
        }
    }
}

impl EditorConfig {
    /// Loads a config from a JSON file. Missing keys fall back to their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
