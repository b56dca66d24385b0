use super::Expression;
use serde::{Deserialize, Serialize};

/// The kinds of gate a condition can express on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    /// Must hold before the step starts.
    Precondition,
    /// Must hold after the step finishes.
    Postcondition,
    /// When it holds, the step is skipped.
    Skip,
    /// When it holds, the step is retried.
    Retry,
}

/// A named boolean gate on a step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// `None` until the author picks a kind; required at submission.
    pub name: Option<ConditionKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expression: Expression,
}
