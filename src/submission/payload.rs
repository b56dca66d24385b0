use crate::error::ConversionError;
use crate::workflow::{
    Condition, ConditionKind, Expression, Operand, Operator, Step, StepCode, Workflow,
    WorkflowKind,
};
use serde::{Deserialize, Serialize};

/// The create/update body expected by the workflow persistence API.
///
/// Optional fields that are blank in the editor are absent here rather than `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<WorkflowKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiosk_version_id: Option<String>,
    pub steps: Vec<StepPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    /// Blank for records created before step codes existed.
    #[serde(default)]
    pub step_code: String,
    pub name: String,
    pub sequence: u32,
    #[serde(rename = "type")]
    pub function_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_function_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_step_code: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPayload {
    pub name: Option<ConditionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expression: ExpressionPayload,
}

/// Expression on the wire: operands keep their tagged shape, the operator uses the
/// API's short names (`eq`, `gte`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionPayload {
    pub left: Operand,
    pub operator: String,
    pub right: Operand,
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn present_opt(value: Option<&str>) -> Option<String> {
    value.and_then(present)
}

/// Maps a workflow to its wire payload.
///
/// `kiosk_version_id` is the binding currently selected in the editor; when `None`
/// the workflow's own binding is sent.
pub fn to_payload(workflow: &Workflow, kiosk_version_id: Option<&str>) -> WorkflowPayload {
    WorkflowPayload {
        name: workflow.name.clone(),
        description: present_opt(workflow.description.as_deref()),
        kind: workflow.kind,
        product_id: present_opt(workflow.product_id.as_deref()),
        kiosk_version_id: present_opt(kiosk_version_id)
            .or_else(|| present_opt(workflow.kiosk_version_id.as_deref())),
        steps: workflow.steps.iter().map(step_payload).collect(),
    }
}

fn step_payload(step: &Step) -> StepPayload {
    StepPayload {
        step_code: step.step_code.to_string(),
        name: step.name.clone(),
        sequence: step.sequence,
        function_type: step.function_type.clone(),
        device_model_id: present(&step.device_model_id),
        device_function_id: present(&step.device_function_id),
        parameters: step.parameters.clone().filter(|p| !p.is_null()),
        max_retries: step.max_retries,
        callback_workflow_id: present_opt(step.callback_workflow_id.as_deref()),
        callback_step_code: step
            .callback_step_code
            .as_ref()
            .and_then(|c| present(c.as_str())),
        conditions: step
            .conditions
            .iter()
            .map(|c| ConditionPayload {
                name: c.name,
                description: present_opt(c.description.as_deref()),
                expression: ExpressionPayload {
                    left: c.expression.left.clone(),
                    operator: c.expression.operator.external_name().to_string(),
                    right: c.expression.right.clone(),
                },
            })
            .collect(),
    }
}

/// A trait for external records that can be read back into an editable `Workflow`.
pub trait IntoWorkflow {
    fn into_workflow(self) -> Result<Workflow, ConversionError>;
}

impl IntoWorkflow for WorkflowPayload {
    fn into_workflow(self) -> Result<Workflow, ConversionError> {
        let steps = self
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| step.into_step(index))
            .collect::<Result<_, _>>()?;

        Ok(Workflow {
            name: self.name,
            description: self.description,
            kind: self.kind,
            product_id: self.product_id,
            kiosk_version_id: self.kiosk_version_id,
            steps,
        })
    }
}

impl StepPayload {
    fn into_step(self, index: usize) -> Result<Step, ConversionError> {
        let conditions = self
            .conditions
            .into_iter()
            .enumerate()
            .map(|(j, c)| -> Result<Condition, ConversionError> {
                let operator = Operator::from_external(&c.expression.operator).ok_or_else(|| {
                    ConversionError::InvalidValue {
                        field: format!("steps[{}].conditions[{}].expression.operator", index, j),
                        message: format!("unknown operator '{}'", c.expression.operator),
                    }
                })?;
                Ok(Condition {
                    name: c.name,
                    description: c.description,
                    expression: Expression {
                        left: c.expression.left,
                        operator,
                        right: c.expression.right,
                    },
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Step {
            step_code: StepCode::new(self.step_code),
            name: self.name,
            sequence: self.sequence,
            function_type: self.function_type,
            device_model_id: self.device_model_id.unwrap_or_default(),
            device_function_id: self.device_function_id.unwrap_or_default(),
            parameters: self.parameters,
            max_retries: self.max_retries,
            callback_workflow_id: self.callback_workflow_id,
            callback_step_code: self.callback_step_code.map(StepCode::new),
            conditions,
        })
    }
}
