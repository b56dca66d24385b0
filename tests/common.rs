//! Common test utilities for building workflows, catalogs and stores.
use keiro::prelude::*;
use std::sync::Arc;

/// A bare step with the given code and sequence.
#[allow(dead_code)]
pub fn step(code: &str, sequence: u32) -> Step {
    Step::new(StepCode::new(code), sequence)
}

/// A bare step whose callback points at `target`.
#[allow(dead_code)]
pub fn step_with_callback(code: &str, sequence: u32, target: &str) -> Step {
    Step {
        callback_step_code: Some(StepCode::new(target)),
        ..step(code, sequence)
    }
}

/// Wraps steps in a named production workflow.
#[allow(dead_code)]
pub fn workflow(steps: Vec<Step>) -> Workflow {
    Workflow {
        name: "Espresso".to_string(),
        kind: Some(WorkflowKind::Production),
        steps,
        ..Default::default()
    }
}

/// Two device models:
///
/// * `grinder` with `grind` (id `fn-grind`) and the legacy, id-less `pulse`
/// * `brewer` with `brew` (id `fn-brew`)
#[allow(dead_code)]
pub fn sample_catalog() -> DeviceCatalog {
    DeviceCatalog::new(vec![
        DeviceModel {
            id: "grinder".to_string(),
            name: "Grinder".to_string(),
            functions: vec![
                DeviceFunction {
                    id: Some("fn-grind".to_string()),
                    name: "grind".to_string(),
                    parameter_schema: serde_json::json!({"grams": "number"}),
                },
                DeviceFunction {
                    id: None,
                    name: "pulse".to_string(),
                    parameter_schema: serde_json::Value::Null,
                },
            ],
        },
        DeviceModel {
            id: "brewer".to_string(),
            name: "Brewer".to_string(),
            functions: vec![DeviceFunction {
                id: Some("fn-brew".to_string()),
                name: "brew".to_string(),
                parameter_schema: serde_json::Value::Null,
            }],
        },
    ])
}

/// Loads `steps` into a store with predictable `gen-N` codes and the sample catalog.
#[allow(dead_code)]
pub fn store_with(steps: Vec<Step>) -> StepStore {
    StepStore::builder()
        .with_catalog(Arc::new(sample_catalog()))
        .with_code_generator(Box::new(SequentialCodes::new("gen")))
        .load(workflow(steps))
}

/// A fully bound step that passes the standard schema.
#[allow(dead_code)]
pub fn complete_step(code: &str, sequence: u32, name: &str) -> Step {
    Step {
        name: name.to_string(),
        function_type: "grind".to_string(),
        device_model_id: "grinder".to_string(),
        device_function_id: "fn-grind".to_string(),
        parameters: Some(serde_json::json!({"grams": 18})),
        max_retries: 2,
        ..step(code, sequence)
    }
}

/// A workflow that passes the standard schema, with one conditioned step and a callback.
#[allow(dead_code)]
pub fn complete_workflow() -> Workflow {
    let mut check = complete_step("check", 2, "Check dose");
    check.callback_step_code = Some(StepCode::new("grind"));
    check.conditions.push(Condition {
        name: Some(ConditionKind::Retry),
        description: Some("Regrind when underweight".to_string()),
        expression: Expression {
            left: Operand::Variable("dose_grams".to_string()),
            operator: Operator::LessThan,
            right: Operand::Literal("17".to_string()),
        },
    });

    Workflow {
        name: "Espresso".to_string(),
        description: Some("Single shot".to_string()),
        kind: Some(WorkflowKind::Production),
        product_id: Some("prod-espresso".to_string()),
        kiosk_version_id: Some("kv-3".to_string()),
        steps: vec![complete_step("grind", 1, "Grind beans"), check],
    }
}

/// Codes of the store's steps, in list order.
#[allow(dead_code)]
pub fn codes(store: &StepStore) -> Vec<String> {
    store
        .steps()
        .iter()
        .map(|s| s.step_code.to_string())
        .collect()
}
