//! Tests for the step store and its mutation API.
mod common;
use common::*;
use keiro::prelude::*;
use std::sync::Arc;

/// Always proposes the same code, to exercise collision handling.
struct ConstantCodes(&'static str);

impl CodeGenerator for ConstantCodes {
    fn next_code(&mut self) -> String {
        self.0.to_string()
    }
}

#[test]
fn test_new_store_is_seeded_with_one_step() {
    let store = StepStore::builder().build();
    assert_eq!(store.steps().len(), 1);
    assert_eq!(store.steps()[0].sequence, 1);
    assert!(!store.steps()[0].step_code.is_empty());
    assert_eq!(store.graph().nodes.len(), 1);
}

#[test]
fn test_random_codes_use_configured_length() {
    let config = EditorConfig {
        step_code_length: 12,
        ..Default::default()
    };
    let mut store = StepStore::builder().with_config(config).build();
    store.add_step();
    for step in store.steps() {
        assert_eq!(step.step_code.as_str().len(), 12);
        assert!(step.step_code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }
    assert_ne!(store.steps()[0].step_code, store.steps()[1].step_code);
}

#[test]
fn test_add_step_goes_one_level_below_the_deepest() {
    let mut store = store_with(vec![step("a", 3), step("b", 7), step("c", 2)]);
    let index = store.add_step();

    assert_eq!(index, 3);
    assert_eq!(store.steps()[3].sequence, 8);
    assert_eq!(store.steps()[3].step_code.as_str(), "gen-1");
}

#[test]
fn test_add_step_on_empty_store_starts_at_one() {
    let mut store = store_with(vec![step("a", 4)]);
    store.remove_step(0);
    assert!(store.steps().is_empty());

    store.add_step();
    assert_eq!(store.steps()[0].sequence, 1);
}

#[test]
fn test_add_step_skips_taken_codes() {
    let mut store = store_with(vec![step("gen-1", 1), step("gen-2", 1)]);
    store.add_step();
    assert_eq!(codes(&store), vec!["gen-1", "gen-2", "gen-3"]);
}

#[test]
fn test_add_step_falls_back_to_suffix_when_generator_keeps_colliding() {
    let mut store = StepStore::builder()
        .with_code_generator(Box::new(ConstantCodes("dup")))
        .load(workflow(vec![step("dup", 1)]));

    store.add_step();
    store.add_step();
    assert_eq!(codes(&store), vec!["dup", "dup-1", "dup-2"]);
}

#[test]
fn test_remove_step_clears_callbacks_to_it() {
    let mut store = store_with(vec![
        step("a", 1),
        step_with_callback("b", 2, "a"),
        step_with_callback("c", 2, "a"),
        step_with_callback("d", 3, "b"),
    ]);

    store.remove_step(0);

    assert_eq!(codes(&store), vec!["b", "c", "d"]);
    assert_eq!(store.steps()[0].callback_step_code, None);
    assert_eq!(store.steps()[1].callback_step_code, None);
    assert_eq!(
        store.steps()[2].callback_step_code,
        Some(StepCode::new("b"))
    );
}

#[test]
fn test_remove_step_adjusts_editing_pointer() {
    let mut store = store_with(vec![step("a", 1), step("b", 2), step("c", 3)]);

    store.set_editing(Some(2));
    store.remove_step(0);
    assert_eq!(store.editing(), Some(1), "later index shifts down");

    store.set_editing(Some(0));
    store.remove_step(1);
    assert_eq!(store.editing(), Some(0), "earlier index is unchanged");

    store.remove_step(0);
    assert_eq!(store.editing(), None, "removed index is cleared");
}

#[test]
fn test_remove_out_of_range_is_a_no_op() {
    let mut store = store_with(vec![step("a", 1)]);
    let version = store.version();

    assert!(store.remove_step(5).is_none());
    assert_eq!(store.version(), version);
    assert_eq!(store.steps().len(), 1);
}

#[test]
fn test_batch_removal_clears_every_dangling_callback() {
    let mut store = store_with(vec![
        step("a", 1),
        step("b", 1),
        step_with_callback("c", 2, "a"),
        step_with_callback("d", 2, "b"),
    ]);
    store.set_editing(Some(3));

    let removed = store.remove_steps(&[1, 0, 1, 99]);

    let removed_codes: Vec<_> = removed.iter().map(|s| s.step_code.as_str()).collect();
    assert_eq!(removed_codes, vec!["a", "b"]);
    assert_eq!(codes(&store), vec!["c", "d"]);
    assert!(store.steps().iter().all(|s| s.callback_step_code.is_none()));
    assert_eq!(store.editing(), Some(1));
    assert!(store.graph().edges.is_empty());
}

#[test]
fn test_move_step_swaps_neighbours_and_stops_at_boundaries() {
    let mut store = store_with(vec![step("a", 1), step("b", 2), step("c", 3)]);

    assert!(!store.move_step(0, Direction::Up));
    assert!(!store.move_step(2, Direction::Down));
    assert!(!store.move_step(7, Direction::Up));
    assert_eq!(codes(&store), vec!["a", "b", "c"]);

    assert!(store.move_step(0, Direction::Down));
    assert_eq!(codes(&store), vec!["b", "a", "c"]);

    assert!(store.move_step(2, Direction::Up));
    assert_eq!(codes(&store), vec!["b", "c", "a"]);
}

#[test]
fn test_move_step_carries_editing_pointer_and_errors() {
    let mut store = store_with(vec![step("a", 1), step("b", 2)]);
    let mut errors = ErrorMap::new();
    errors.insert(FieldPath::step(0, "name"), "Step name is required");
    store.set_errors(errors);
    store.set_editing(Some(0));

    store.move_step(0, Direction::Down);

    assert_eq!(store.editing(), Some(1));
    assert!(store.errors().contains(&FieldPath::step(1, "name")));
    assert!(!store.errors().contains(&FieldPath::step(0, "name")));
    assert!(store.graph().node("a").is_some_and(|n| n.has_error));
}

#[test]
fn test_changing_device_model_clears_function_binding() {
    let mut store = store_with(vec![complete_step("a", 1, "Grind")]);

    store.update_step_field(0, StepField::DeviceModelId, "brewer");

    let step = &store.steps()[0];
    assert_eq!(step.device_model_id, "brewer");
    assert_eq!(step.device_function_id, "");
    assert_eq!(step.function_type, "");
    assert_eq!(step.parameters, None);
}

#[test]
fn test_changing_device_model_to_same_value_still_clears_binding() {
    let mut store = store_with(vec![complete_step("a", 1, "Grind")]);
    store.update_step_field(0, StepField::DeviceModelId, "grinder");

    let step = &store.steps()[0];
    assert_eq!(step.device_function_id, "");
    assert_eq!(step.function_type, "");
    assert_eq!(step.parameters, None);
}

#[test]
fn test_device_function_derives_type_from_catalog() {
    let mut store = store_with(vec![step("a", 1)]);
    store.update_step_field(0, StepField::DeviceModelId, "grinder");

    store.update_step_field(0, StepField::DeviceFunctionId, "fn-grind");
    assert_eq!(store.steps()[0].function_type, "grind");

    // Legacy functions without an id are matched by name.
    store.update_step_field(0, StepField::DeviceFunctionId, "pulse");
    assert_eq!(store.steps()[0].function_type, "pulse");

    store.update_step_field(0, StepField::DeviceFunctionId, "fn-brew");
    assert_eq!(store.steps()[0].function_type, "", "brew belongs to another model");
}

#[test]
fn test_device_function_without_catalog_clears_type() {
    let mut store = StepStore::builder().load(workflow(vec![complete_step("a", 1, "Grind")]));
    store.update_step_field(0, StepField::DeviceFunctionId, "fn-grind");
    assert_eq!(store.steps()[0].function_type, "");

    store.set_catalog(Arc::new(sample_catalog()));
    store.update_step_field(0, StepField::DeviceFunctionId, "fn-grind");
    assert_eq!(store.steps()[0].function_type, "grind");
}

#[test]
fn test_max_retries_is_coerced_to_a_non_negative_integer() {
    let mut store = store_with(vec![step("a", 1)]);
    let cases = [
        (serde_json::json!("4"), 4),
        (serde_json::json!(2.7), 2),
        (serde_json::json!(-3), 0),
        (serde_json::json!("abc"), 0),
        (serde_json::json!(null), 0),
        (serde_json::json!(" 6 "), 6),
    ];
    for (input, expected) in cases {
        store.update_step_field(0, StepField::MaxRetries, input.clone());
        assert_eq!(store.steps()[0].max_retries, expected, "input {input}");
    }
}

#[test]
fn test_sequence_is_coerced_to_a_positive_integer() {
    let mut store = store_with(vec![step("a", 1)]);
    store.update_step_field(0, StepField::Sequence, "3");
    assert_eq!(store.steps()[0].sequence, 3);
    store.update_step_field(0, StepField::Sequence, 0);
    assert_eq!(store.steps()[0].sequence, 1);
    store.update_step_field(0, StepField::Sequence, "x");
    assert_eq!(store.steps()[0].sequence, 1);
}

#[test]
fn test_name_and_callback_normalisation() {
    let mut store = store_with(vec![step("a", 1), step("b", 2)]);

    store.update_step_field(0, StepField::Name, 42);
    assert_eq!(store.steps()[0].name, "42");
    store.update_step_field(0, StepField::Name, "");
    assert_eq!(store.steps()[0].name, "");

    store.update_step_field(1, StepField::CallbackStepCode, "a");
    assert_eq!(store.steps()[1].callback_step_code, Some(StepCode::new("a")));
    store.update_step_field(1, StepField::CallbackStepCode, "");
    assert_eq!(store.steps()[1].callback_step_code, None);

    store.update_step_field(1, StepField::CallbackWorkflowId, "wf-9");
    assert_eq!(store.steps()[1].callback_workflow_id.as_deref(), Some("wf-9"));
}

#[test]
fn test_update_preserves_other_fields() {
    let original = complete_step("a", 1, "Grind");
    let mut store = store_with(vec![original.clone()]);

    store.update_step_field(0, StepField::MaxRetries, 5);

    let expected = Step {
        max_retries: 5,
        ..original
    };
    assert_eq!(store.steps()[0], expected);
}

#[test]
fn test_update_out_of_range_is_ignored() {
    let mut store = store_with(vec![step("a", 1)]);
    let version = store.version();
    assert!(!store.update_step_field(3, StepField::Name, "x"));
    assert_eq!(store.version(), version);
}

#[test]
fn test_editing_a_field_clears_only_its_error() {
    let mut store = store_with(vec![step("a", 1), step("b", 2)]);
    let errors: ErrorMap = [
        (FieldPath::workflow("name"), "Name is required".to_string()),
        (FieldPath::step(0, "name"), "Step name is required".to_string()),
        (FieldPath::step(0, "deviceModelId"), "Device model is required".to_string()),
        (FieldPath::step(1, "name"), "Step name is required".to_string()),
    ]
    .into_iter()
    .collect();
    store.set_errors(errors);

    store.update_step_field(0, StepField::Name, "Grind");

    assert_eq!(store.errors().len(), 3);
    assert!(!store.errors().contains(&FieldPath::step(0, "name")));
    assert!(store.errors().contains(&FieldPath::step(0, "deviceModelId")));
    assert!(store.errors().contains(&FieldPath::step(1, "name")));
    assert!(store.errors().contains(&FieldPath::workflow("name")));
}

#[test]
fn test_every_mutation_bumps_version_and_snapshots_stay_frozen() {
    let mut store = store_with(vec![step("a", 1)]);
    let before = store.snapshot();

    store.update_step_field(0, StepField::Name, "Grind");
    store.add_step();

    assert_eq!(store.version(), before.version + 2);
    assert_eq!(before.workflow.steps.len(), 1);
    assert_eq!(before.workflow.steps[0].name, "");
    assert_eq!(store.steps()[0].name, "Grind");
}

#[test]
fn test_load_repairs_missing_and_duplicate_codes() {
    let store = store_with(vec![step("", 1), step("x", 1), step("x", 2), step("gen-1", 3)]);

    let codes = codes(&store);
    assert_eq!(codes[1], "x", "first holder keeps its code");
    assert_eq!(codes[3], "gen-1");
    assert!(codes.iter().all(|c| !c.is_empty()));

    let mut unique = codes.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), codes.len(), "codes must be unique: {codes:?}");
}

#[test]
fn test_load_raises_zero_sequence_and_seeds_empty_workflows() {
    let store = store_with(vec![step("a", 0)]);
    assert_eq!(store.steps()[0].sequence, 1);

    let store = store_with(Vec::new());
    assert_eq!(store.steps().len(), 1);
    assert_eq!(store.steps()[0].sequence, 1);
}

#[test]
fn test_new_condition_defaults() {
    let mut store = store_with(vec![step("a", 1)]);
    let index = store.add_condition(0).expect("step 0 exists");

    let condition = &store.steps()[0].conditions[index];
    assert_eq!(condition.name, None);
    assert_eq!(condition.expression.left, Operand::Variable(String::new()));
    assert_eq!(condition.expression.operator, Operator::Equal);
    assert_eq!(condition.expression.right, Operand::Literal(String::new()));

    assert_eq!(store.add_condition(9), None);
}

#[test]
fn test_condition_field_updates() {
    let mut store = store_with(vec![step("a", 1)]);
    store.add_condition(0);

    store.update_condition_field(0, 0, ConditionField::Name, "RETRY");
    store.update_condition_field(0, 0, ConditionField::LeftValue, "dose_grams");
    store.update_condition_field(0, 0, ConditionField::Operator, ">=");
    store.update_condition_field(0, 0, ConditionField::RightValue, "17");
    store.update_condition_field(0, 0, ConditionField::Description, "  ");

    let condition = &store.steps()[0].conditions[0];
    assert_eq!(condition.name, Some(ConditionKind::Retry));
    assert_eq!(condition.description, None);
    assert_eq!(condition.expression.to_string(), "$dose_grams >= 17");

    store.update_condition_field(0, 0, ConditionField::Operator, "lt");
    store.update_condition_field(0, 0, ConditionField::Operator, "between");
    assert_eq!(store.steps()[0].conditions[0].expression.operator, Operator::LessThan);

    // Switching type keeps the value.
    store.update_condition_field(0, 0, ConditionField::LeftType, "Literal");
    store.update_condition_field(0, 0, ConditionField::RightType, "Variable");
    let expression = &store.steps()[0].conditions[0].expression;
    assert_eq!(expression.left, Operand::Literal("dose_grams".to_string()));
    assert_eq!(expression.right, Operand::Variable("17".to_string()));

    assert!(!store.update_condition_field(0, 4, ConditionField::Name, "SKIP"));
}

#[test]
fn test_remove_condition_reindexes_its_errors() {
    let mut store = store_with(vec![step("a", 1)]);
    store.add_condition(0);
    store.add_condition(0);
    store.add_condition(0);
    let errors: ErrorMap = [
        (FieldPath::condition(0, 0, "name"), "Condition type is required".to_string()),
        (FieldPath::condition(0, 1, "name"), "Condition type is required".to_string()),
        (
            FieldPath::condition(0, 2, "expression.left.value"),
            "Left operand is required".to_string(),
        ),
    ]
    .into_iter()
    .collect();
    store.set_errors(errors);

    let removed = store.remove_condition(0, 1);
    assert!(removed.is_some());
    assert_eq!(store.steps()[0].conditions.len(), 2);

    assert_eq!(store.errors().len(), 2);
    assert!(store.errors().contains(&FieldPath::condition(0, 0, "name")));
    assert!(store
        .errors()
        .contains(&FieldPath::condition(0, 1, "expression.left.value")));

    assert!(store.remove_condition(0, 5).is_none());
}

#[test]
fn test_changing_product_clears_kiosk_version() {
    let mut store = StepStore::builder().load(complete_workflow());
    assert_eq!(store.workflow().kiosk_version_id.as_deref(), Some("kv-3"));

    store.update_workflow_field(WorkflowField::ProductId, "prod-espresso");
    assert_eq!(store.workflow().kiosk_version_id.as_deref(), Some("kv-3"));

    store.update_workflow_field(WorkflowField::ProductId, "prod-latte");
    assert_eq!(store.workflow().product_id.as_deref(), Some("prod-latte"));
    assert_eq!(store.workflow().kiosk_version_id, None);

    store.update_workflow_field(WorkflowField::KioskVersionId, "kv-7");
    store.update_workflow_field(WorkflowField::Kind, "cleaning");
    store.update_workflow_field(WorkflowField::Description, "");
    let workflow = store.workflow();
    assert_eq!(workflow.kiosk_version_id.as_deref(), Some("kv-7"));
    assert_eq!(workflow.kind, Some(WorkflowKind::Cleaning));
    assert_eq!(workflow.description, None);
}

#[test]
fn test_callback_to_own_code_is_cleared() {
    let mut store = store_with(vec![step("a", 1), step("b", 2)]);
    store.update_step_field(1, StepField::CallbackStepCode, "a");

    assert!(store.update_step_field(0, StepField::CallbackStepCode, "a"));
    assert_eq!(store.steps()[0].callback_step_code, None);

    // Pointing at itself also drops an existing callback.
    store.update_step_field(1, StepField::CallbackStepCode, "b");
    assert_eq!(store.steps()[1].callback_step_code, None);

    assert!(store.graph().edges.iter().all(|e| e.source != e.target));
}

#[test]
fn test_bind_callback_refuses_self_loops() {
    let mut store = store_with(vec![step("a", 1), step("b", 2)]);
    let version = store.version();

    assert!(!store.bind_callback(&StepCode::new("a"), &StepCode::new("a")));
    assert_eq!(store.steps()[0].callback_step_code, None);
    assert_eq!(store.version(), version);
    assert!(store.graph().edges_of_kind(EdgeKind::Callback).next().is_none());
}

#[test]
fn test_bind_callback_keeps_an_existing_callback() {
    let mut store = store_with(vec![step("a", 1), step("b", 1), step("c", 1)]);
    assert!(store.bind_callback(&StepCode::new("a"), &StepCode::new("b")));

    // Binding the same pair again is accepted; a different target is not.
    assert!(store.bind_callback(&StepCode::new("a"), &StepCode::new("b")));
    assert!(!store.bind_callback(&StepCode::new("a"), &StepCode::new("c")));
    assert_eq!(store.steps()[0].callback_step_code, Some(StepCode::new("b")));

    // An explicit field update still retargets it.
    store.update_step_field(0, StepField::CallbackStepCode, "c");
    assert_eq!(store.steps()[0].callback_step_code, Some(StepCode::new("c")));
}

#[test]
fn test_add_step_at_maximum_sequence_stays_in_range() {
    let mut store = store_with(vec![step("a", u32::MAX)]);
    let index = store.add_step();
    assert_eq!(store.steps()[index].sequence, u32::MAX);
    assert_eq!(store.graph().node("gen-1").map(|n| n.level), Some(0));
}
