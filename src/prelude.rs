//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the keiro crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//!
//! let mut store = StepStore::builder().build();
//! store.add_step();
//! let graph = store.graph();
//! assert_eq!(graph.edges_of_kind(EdgeKind::Sequence).count(), 1);
//! ```

// Step store and editing
pub use crate::store::{
    CodeGenerator, ConditionField, Direction, ErrorMap, FieldPath, RandomCodes, SequentialCodes,
    StepField, StepStore, StoreSnapshot, WorkflowField,
};

// Workflow model
pub use crate::workflow::{
    Condition, ConditionKind, Expression, Operand, OperandKind, Operator, Step, StepCode,
    Workflow, WorkflowKind,
};

// Catalog snapshot
pub use crate::catalog::{DeviceCatalog, DeviceFunction, DeviceModel, FunctionCatalog};

// Graph derivation and interactive connections
pub use crate::connection::{Connection, EditableGraph};
pub use crate::graph::{EdgeKind, GraphEdge, GraphNode, Position, StepGraph, derive_graph};

// Submission boundary
pub use crate::submission::{
    InMemoryRepository, IntoWorkflow, StandardSchema, StoredWorkflow, ValidationSchema,
    WorkflowPayload, WorkflowRepository, to_payload,
};

// Configuration
pub use crate::config::{EditorConfig, LayoutConfig, SchemaConfig};

// Error types
pub use crate::error::{
    ConfigError, ConnectionError, ConversionError, RepositoryError, SubmissionError,
};
