//! # Keiro - Workflow Step Graph Authoring Engine
//!
//! **Keiro** keeps the in-memory model of a workflow while it is being authored and
//! derives from it the directed graph an editor canvas renders. A workflow is a flat,
//! reorderable list of steps; each step sits at a `sequence` depth, may be gated by
//! conditions, and may reroute to another step through a callback.
//!
//! ## Core Workflow
//!
//! 1.  **Open a Store**: Build a `StepStore` for a new workflow, or load one read from storage.
//! 2.  **Edit**: Add, remove, move and update steps and conditions. Every mutation is
//!     total and re-derives the `StepGraph` synchronously.
//! 3.  **Connect**: Route interactive connections through an `EditableGraph`, which
//!     rejects self-loops, reverse duplicates and a second outgoing connection.
//! 4.  **Submit**: Validate against a `ValidationSchema` and map the workflow to the
//!     `WorkflowPayload` the persistence API expects.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = DeviceCatalog::new(vec![DeviceModel {
//!         id: "grinder".to_string(),
//!         name: "Grinder".to_string(),
//!         functions: vec![DeviceFunction {
//!             id: Some("fn-grind".to_string()),
//!             name: "grind".to_string(),
//!             parameter_schema: serde_json::Value::Null,
//!         }],
//!     }]);
//!
//!     let mut store = StepStore::builder().with_catalog(Arc::new(catalog)).build();
//!     store.update_workflow_field(WorkflowField::Name, "Espresso");
//!     store.update_workflow_field(WorkflowField::Kind, "PRODUCTION");
//!     store.update_step_field(0, StepField::Name, "Grind beans");
//!     store.update_step_field(0, StepField::DeviceModelId, "grinder");
//!     store.update_step_field(0, StepField::DeviceFunctionId, "fn-grind");
//!
//!     let second = store.add_step();
//!     store.update_step_field(second, StepField::Name, "Tamp");
//!
//!     // Steps 0 and 1 sit on consecutive levels, so one sequence edge joins them.
//!     println!("{} nodes, {} edges", store.graph().nodes.len(), store.graph().edges.len());
//!
//!     let mut canvas = EditableGraph::new(store.graph());
//!     let first = store.steps()[0].step_code.clone();
//!     if let Err(rejection) = canvas.connect(Connection::new(first.as_str(), first.as_str())) {
//!         println!("-> {}", rejection);
//!     }
//!
//!     match store.submit(&StandardSchema::default(), None) {
//!         Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
//!         Err(SubmissionError::Invalid { errors, first_step }) => {
//!             println!("{} error(s), first at step {:?}", errors.len(), first_step);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod store;
pub mod submission;
pub mod workflow;
