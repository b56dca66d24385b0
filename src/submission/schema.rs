use crate::config::SchemaConfig;
use crate::store::{ErrorMap, FieldPath};
use crate::workflow::{Step, Workflow};

/// Declarative required/optional rules applied to a full workflow before it is persisted.
pub trait ValidationSchema {
    /// Returns `None` when the workflow is valid, otherwise every failing field path.
    fn validate(&self, workflow: &Workflow) -> Option<ErrorMap>;
}

/// The default rule set: required names with length bounds, a workflow type, at least
/// one step, complete device bindings per step, and complete conditions.
#[derive(Debug, Clone, Default)]
pub struct StandardSchema {
    config: SchemaConfig,
}

impl StandardSchema {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    fn check_workflow(&self, workflow: &Workflow, errors: &mut ErrorMap) {
        let name_len = workflow.name.trim().chars().count();
        if name_len == 0 {
            errors.insert(FieldPath::workflow("name"), "Name is required");
        } else if name_len < self.config.name_min_len || name_len > self.config.name_max_len {
            errors.insert(
                FieldPath::workflow("name"),
                format!(
                    "Name must be between {} and {} characters",
                    self.config.name_min_len, self.config.name_max_len
                ),
            );
        }
        if workflow.kind.is_none() {
            errors.insert(FieldPath::workflow("type"), "Type is required");
        }
        if workflow.steps.is_empty() {
            errors.insert(FieldPath::workflow("steps"), "At least one step is required");
        }
    }

    fn check_step(&self, index: usize, step: &Step, errors: &mut ErrorMap) {
        let name_len = step.name.trim().chars().count();
        if name_len == 0 {
            errors.insert(FieldPath::step(index, "name"), "Step name is required");
        } else if name_len > self.config.step_name_max_len {
            errors.insert(
                FieldPath::step(index, "name"),
                format!(
                    "Step name must be at most {} characters",
                    self.config.step_name_max_len
                ),
            );
        }
        if step.sequence < 1 {
            errors.insert(FieldPath::step(index, "sequence"), "Sequence must be at least 1");
        }
        if step.device_model_id.trim().is_empty() {
            errors.insert(FieldPath::step(index, "deviceModelId"), "Device model is required");
        }
        if step.device_function_id.trim().is_empty() {
            errors.insert(
                FieldPath::step(index, "deviceFunctionId"),
                "Device function is required",
            );
        } else if step.function_type.trim().is_empty() {
            errors.insert(FieldPath::step(index, "type"), "Type is required");
        }

        for (j, condition) in step.conditions.iter().enumerate() {
            if condition.name.is_none() {
                errors.insert(
                    FieldPath::condition(index, j, "name"),
                    "Condition type is required",
                );
            }
            if condition.expression.left.is_blank() {
                errors.insert(
                    FieldPath::condition(index, j, "expression.left.value"),
                    "Left operand is required",
                );
            }
            if condition.expression.right.is_blank() {
                errors.insert(
                    FieldPath::condition(index, j, "expression.right.value"),
                    "Right operand is required",
                );
            }
        }
    }
}

impl ValidationSchema for StandardSchema {
    fn validate(&self, workflow: &Workflow) -> Option<ErrorMap> {
        let mut errors = ErrorMap::new();
        self.check_workflow(workflow, &mut errors);
        for (index, step) in workflow.steps.iter().enumerate() {
            self.check_step(index, step, &mut errors);
        }
        if errors.is_empty() { None } else { Some(errors) }
    }
}
