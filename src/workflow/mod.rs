//! The authored workflow: top-level metadata plus the ordered step list.

pub mod condition;
pub mod expression;
pub mod step;

pub use condition::*;
pub use expression::*;
pub use step::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a workflow is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    /// Prepares a recipe for a customer order.
    Production,
    Cleaning,
    Maintenance,
    Calibration,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 4] = [
        WorkflowKind::Production,
        WorkflowKind::Cleaning,
        WorkflowKind::Maintenance,
        WorkflowKind::Calibration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Production => "PRODUCTION",
            WorkflowKind::Cleaning => "CLEANING",
            WorkflowKind::Maintenance => "MAINTENANCE",
            WorkflowKind::Calibration => "CALIBRATION",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown workflow type '{}'", s))
    }
}

/// A workflow definition as held by the editor. It owns its steps exclusively.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workflow {
    pub name: String,
    pub description: Option<String>,
    /// `None` until chosen; required at submission.
    #[serde(rename = "type")]
    pub kind: Option<WorkflowKind>,
    pub product_id: Option<String>,
    pub kiosk_version_id: Option<String>,
    /// Insertion order, not sequence order.
    pub steps: Vec<Step>,
}

impl Workflow {
    pub fn step_by_code(&self, code: &StepCode) -> Option<(usize, &Step)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, step)| &step.step_code == code)
    }

    pub fn max_sequence(&self) -> Option<u32> {
        self.steps.iter().map(|s| s.sequence).max()
    }
}
