use crate::store::ErrorMap;
use thiserror::Error;

/// Reasons an interactively drawn connection is refused.
///
/// The display text is meant to be shown to the author as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("A step cannot be connected to itself")]
    SelfLoop { node_id: String },

    #[error("Steps '{to}' and '{from}' are already connected in the opposite direction")]
    ReverseDuplicate { from: String, to: String },

    #[error("Each step may have only one outgoing connection ('{from}' already has one)")]
    MultipleOutgoing { from: String },

    #[error("Step '{0}' is not part of the workflow graph")]
    UnknownNode(String),
}

/// Errors returned when a workflow is submitted for persistence.
#[derive(Error, Debug, Clone)]
pub enum SubmissionError {
    #[error("Workflow has {} validation error(s)", errors.len())]
    Invalid {
        errors: ErrorMap,
        /// Lowest step index carrying an error, for focusing the editor.
        first_step: Option<usize>,
    },
}

/// Errors that can occur when converting an external record into a `Workflow`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while loading an `EditorConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by a `WorkflowRepository` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Workflow '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
