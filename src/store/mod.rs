//! The step store: single source of truth for a workflow being edited.
//!
//! Every mutation is total. Out-of-range indices and unreadable input are ignored
//! rather than reported, and business validation is deferred to submission. Each
//! accepted mutation produces a new version of the workflow (copy-on-write through
//! [`Arc::make_mut`]) and synchronously re-derives the step graph.

mod codes;
mod errors;
mod field;

pub use codes::{CodeGenerator, RandomCodes, SequentialCodes};
pub use errors::{ErrorMap, FieldPath};
pub use field::{ConditionField, StepField, WorkflowField};

use crate::catalog::{DeviceCatalog, FunctionCatalog};
use crate::config::{EditorConfig, LayoutConfig};
use crate::error::SubmissionError;
use crate::graph::{StepGraph, derive_graph};
use crate::submission::{ValidationSchema, WorkflowPayload, to_payload};
use crate::workflow::{
    Condition, ConditionKind, Operand, OperandKind, Operator, Step, StepCode, Workflow,
};
use ahash::AHashSet;
use codes::unique_code;
use field::*;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Direction for [`StepStore::move_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// An immutable view of the workflow at a given version.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub version: u64,
    pub workflow: Arc<Workflow>,
}

pub struct StepStoreBuilder {
    config: EditorConfig,
    catalog: Arc<dyn FunctionCatalog>,
    codes: Option<Box<dyn CodeGenerator>>,
}

impl StepStoreBuilder {
    pub fn new() -> Self {
        Self {
            config: EditorConfig::default(),
            catalog: Arc::new(DeviceCatalog::default()),
            codes: None,
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn FunctionCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_code_generator(mut self, codes: Box<dyn CodeGenerator>) -> Self {
        self.codes = Some(codes);
        self
    }

    /// A store for a new workflow, seeded with one empty step.
    pub fn build(self) -> StepStore {
        let mut store = self.into_store(Workflow::default());
        store.seed_if_empty();
        store.refresh();
        store
    }

    /// A store for a workflow read from storage.
    ///
    /// Steps without a code, or whose code repeats an earlier step's, get a freshly
    /// generated code that is unique against the complete loaded set. Sequence values
    /// below 1 are raised to 1.
    pub fn load(self, mut workflow: Workflow) -> StepStore {
        for step in workflow.steps.iter_mut() {
            step.sequence = step.sequence.max(1);
        }
        let mut store = self.into_store(Workflow::default());
        let repaired = repair_step_codes(&mut workflow.steps, store.codes.as_mut());
        if repaired > 0 {
            tracing::warn!(repaired, "loaded workflow had missing or duplicate step codes");
        }
        store.workflow = Arc::new(workflow);
        store.seed_if_empty();
        store.refresh();
        store
    }

    fn into_store(self, workflow: Workflow) -> StepStore {
        let codes = self
            .codes
            .unwrap_or_else(|| Box::new(RandomCodes::new(self.config.step_code_length)));
        StepStore {
            workflow: Arc::new(workflow),
            version: 0,
            errors: ErrorMap::new(),
            editing: None,
            catalog: self.catalog,
            codes,
            layout: self.config.layout,
            graph: StepGraph::default(),
        }
    }
}

impl Default for StepStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns one workflow during an editing session.
pub struct StepStore {
    workflow: Arc<Workflow>,
    version: u64,
    errors: ErrorMap,
    editing: Option<usize>,
    catalog: Arc<dyn FunctionCatalog>,
    codes: Box<dyn CodeGenerator>,
    layout: LayoutConfig,
    graph: StepGraph,
}

impl StepStore {
    pub fn builder() -> StepStoreBuilder {
        StepStoreBuilder::new()
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn steps(&self) -> &[Step] {
        &self.workflow.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.workflow.steps.get(index)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: self.version,
            workflow: Arc::clone(&self.workflow),
        }
    }

    /// The graph derived from the current steps and error map.
    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Replaces the error map, e.g. with the result of an external schema.
    pub fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
        self.refresh();
    }

    /// Index of the step currently open for editing.
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn set_editing(&mut self, index: Option<usize>) {
        self.editing = index.filter(|&i| i < self.workflow.steps.len());
    }

    /// Swaps in a freshly fetched catalog. Existing `type` values are left as they are.
    pub fn set_catalog(&mut self, catalog: Arc<dyn FunctionCatalog>) {
        self.catalog = catalog;
    }

    /// Appends a step one level below the deepest existing one and returns its index.
    /// A deepest level at `u32::MAX` has no level below it, so the step joins that level.
    pub fn add_step(&mut self) -> usize {
        let sequence = match self.workflow.max_sequence() {
            None => 1,
            Some(u32::MAX) => {
                tracing::warn!("deepest step is already at the maximum sequence; adding beside it");
                u32::MAX
            }
            Some(deepest) => deepest + 1,
        };
        let taken = self.taken_codes();
        let code = unique_code(self.codes.as_mut(), &taken);
        let index = self.commit("add_step", |wf| {
            wf.steps.push(Step::new(code, sequence));
            wf.steps.len() - 1
        });
        self.refresh();
        tracing::debug!(index, sequence, version = self.version, "added step");
        index
    }

    /// Removes the step at `index`, returning it. Callbacks that targeted it are cleared.
    pub fn remove_step(&mut self, index: usize) -> Option<Step> {
        self.remove_steps(&[index]).pop()
    }

    /// Removes several steps in one operation.
    ///
    /// Every remaining callback that targeted any removed step is cleared, error
    /// entries and the editing pointer are re-indexed, and the graph is derived once.
    /// Invalid and repeated indices are ignored. Removed steps are returned in list order.
    pub fn remove_steps(&mut self, indices: &[usize]) -> Vec<Step> {
        let len = self.workflow.steps.len();
        let mut doomed: Vec<usize> = indices.iter().copied().filter(|&i| i < len).collect();
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return Vec::new();
        }

        let removed = self.commit("remove_steps", |wf| {
            let mut removed = Vec::with_capacity(doomed.len());
            let mut kept = Vec::with_capacity(wf.steps.len() - doomed.len());
            for (index, step) in std::mem::take(&mut wf.steps).into_iter().enumerate() {
                if doomed.binary_search(&index).is_ok() {
                    removed.push(step);
                } else {
                    kept.push(step);
                }
            }
            let removed_codes: AHashSet<&StepCode> = removed.iter().map(|s| &s.step_code).collect();
            for step in kept.iter_mut() {
                if step
                    .callback_step_code
                    .as_ref()
                    .is_some_and(|code| removed_codes.contains(code))
                {
                    step.callback_step_code = None;
                }
            }
            wf.steps = kept;
            removed
        });

        let shift = |index: usize| -> Option<usize> {
            match doomed.binary_search(&index) {
                Ok(_) => None,
                Err(below) => Some(index - below),
            }
        };
        self.errors.remap_steps(shift);
        self.editing = self.editing.and_then(shift);
        self.refresh();

        tracing::debug!(removed = removed.len(), version = self.version, "removed steps");
        removed
    }

    /// Swaps the step at `index` with its neighbour. Returns `false` at either boundary.
    pub fn move_step(&mut self, index: usize, direction: Direction) -> bool {
        let len = self.workflow.steps.len();
        let neighbour = match direction {
            Direction::Up if index > 0 && index < len => index - 1,
            Direction::Down if index + 1 < len => index + 1,
            _ => return false,
        };

        self.commit("move_step", |wf| wf.steps.swap(index, neighbour));

        let swap = |i: usize| -> Option<usize> {
            Some(if i == index {
                neighbour
            } else if i == neighbour {
                index
            } else {
                i
            })
        };
        self.errors.remap_steps(swap);
        self.editing = self.editing.and_then(swap);
        self.refresh();
        true
    }

    /// Sets one field of a step, applying the field's normalisation.
    ///
    /// Changing the device model clears the function binding, its derived `type`
    /// and the parameters. Changing the function re-derives `type` from the catalog
    /// (by id, then by name), or clears it when nothing matches. A callback to the
    /// step's own code is stored as no callback. Returns `false`
    /// when `index` is out of range.
    pub fn update_step_field(
        &mut self,
        index: usize,
        field: StepField,
        value: impl Into<JsonValue>,
    ) -> bool {
        if index >= self.workflow.steps.len() {
            return false;
        }
        let value = value.into();
        let catalog = Arc::clone(&self.catalog);

        self.commit("update_step_field", |wf| {
            let step = &mut wf.steps[index];
            match field {
                StepField::Name => step.name = coerce_string(&value),
                StepField::Sequence => step.sequence = coerce_bounded(&value, 1, 1),
                StepField::MaxRetries => step.max_retries = coerce_bounded(&value, 0, 0),
                StepField::DeviceModelId => {
                    step.device_model_id = coerce_string(&value);
                    step.device_function_id.clear();
                    step.function_type.clear();
                    step.parameters = None;
                }
                StepField::DeviceFunctionId => {
                    step.device_function_id = coerce_string(&value);
                    step.function_type = catalog
                        .find_function(&step.device_model_id, &step.device_function_id)
                        .map(|f| f.name.clone())
                        .unwrap_or_default();
                }
                StepField::Parameters => {
                    step.parameters = match value {
                        JsonValue::Null => None,
                        JsonValue::String(ref s) if s.is_empty() => None,
                        other => Some(other),
                    }
                }
                StepField::CallbackWorkflowId => {
                    step.callback_workflow_id = coerce_optional_string(&value)
                }
                StepField::CallbackStepCode => {
                    step.callback_step_code = coerce_optional_string(&value)
                        .map(StepCode::new)
                        .filter(|code| *code != step.step_code)
                }
            }
        });

        self.errors.clear_path(&FieldPath::step(index, field.key()));
        match field {
            StepField::DeviceModelId => {
                for dependent in ["deviceFunctionId", "type", "parameters"] {
                    self.errors.clear_path(&FieldPath::step(index, dependent));
                }
            }
            StepField::DeviceFunctionId => {
                self.errors.clear_path(&FieldPath::step(index, "type"));
            }
            _ => {}
        }
        self.refresh();

        tracing::debug!(index, field = field.key(), version = self.version, "updated step field");
        true
    }

    /// Sets one top-level workflow field. A new product clears the kiosk version.
    pub fn update_workflow_field(&mut self, field: WorkflowField, value: impl Into<JsonValue>) {
        let value = value.into();
        self.commit("update_workflow_field", |wf| match field {
            WorkflowField::Name => wf.name = coerce_string(&value),
            WorkflowField::Description => wf.description = coerce_optional_string(&value),
            WorkflowField::Kind => wf.kind = coerce_string(&value).parse().ok(),
            WorkflowField::ProductId => {
                let product = coerce_optional_string(&value);
                if product != wf.product_id {
                    wf.kiosk_version_id = None;
                }
                wf.product_id = product;
            }
            WorkflowField::KioskVersionId => wf.kiosk_version_id = coerce_optional_string(&value),
        });

        self.errors.clear_path(&FieldPath::workflow(field.key()));
        if field == WorkflowField::ProductId {
            self.errors
                .clear_path(&FieldPath::workflow(WorkflowField::KioskVersionId.key()));
        }
        self.refresh();
        tracing::debug!(field = field.key(), version = self.version, "updated workflow field");
    }

    /// Appends an empty condition (`$<blank> == <blank>`) and returns its index.
    pub fn add_condition(&mut self, step_index: usize) -> Option<usize> {
        if step_index >= self.workflow.steps.len() {
            return None;
        }
        let index = self.commit("add_condition", |wf| {
            let conditions = &mut wf.steps[step_index].conditions;
            conditions.push(Condition::default());
            conditions.len() - 1
        });
        self.errors.clear_path(&FieldPath::step(step_index, "conditions"));
        self.refresh();
        Some(index)
    }

    pub fn remove_condition(&mut self, step_index: usize, condition_index: usize) -> Option<Condition> {
        let exists = self
            .workflow
            .steps
            .get(step_index)
            .is_some_and(|s| condition_index < s.conditions.len());
        if !exists {
            return None;
        }
        let removed = self.commit("remove_condition", |wf| {
            wf.steps[step_index].conditions.remove(condition_index)
        });
        self.errors.remap_conditions(step_index, |j| match j.cmp(&condition_index) {
            std::cmp::Ordering::Less => Some(j),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(j - 1),
        });
        self.refresh();
        Some(removed)
    }

    /// Sets one field of a condition. Unrecognised enum input leaves the field unchanged;
    /// switching an operand's type keeps its value.
    pub fn update_condition_field(
        &mut self,
        step_index: usize,
        condition_index: usize,
        field: ConditionField,
        value: impl Into<JsonValue>,
    ) -> bool {
        let exists = self
            .workflow
            .steps
            .get(step_index)
            .is_some_and(|s| condition_index < s.conditions.len());
        if !exists {
            return false;
        }
        let value = value.into();

        self.commit("update_condition_field", |wf| {
            let condition = &mut wf.steps[step_index].conditions[condition_index];
            let expression = &mut condition.expression;
            match field {
                ConditionField::Name => condition.name = coerce_enum::<ConditionKind>(&value),
                ConditionField::Description => {
                    condition.description = coerce_optional_string(&value)
                }
                ConditionField::LeftType => {
                    if let Some(kind) = coerce_enum::<OperandKind>(&value) {
                        retag(&mut expression.left, kind);
                    }
                }
                ConditionField::RightType => {
                    if let Some(kind) = coerce_enum::<OperandKind>(&value) {
                        retag(&mut expression.right, kind);
                    }
                }
                ConditionField::LeftValue => revalue(&mut expression.left, coerce_string(&value)),
                ConditionField::RightValue => {
                    revalue(&mut expression.right, coerce_string(&value))
                }
                ConditionField::Operator => {
                    let parsed = coerce_string(&value)
                        .parse::<Operator>()
                        .ok()
                        .or_else(|| coerce_enum::<Operator>(&value));
                    if let Some(operator) = parsed {
                        expression.operator = operator;
                    }
                }
            }
        });

        self.errors
            .clear_path(&FieldPath::condition(step_index, condition_index, field.key()));
        self.refresh();
        true
    }

    /// Points `source`'s callback at `target`, committing an accepted connection.
    ///
    /// Returns `false` without changing anything if either code is not in the workflow,
    /// if `source` and `target` are the same step, or if `source` already calls back to
    /// a different step. Replacing an existing callback goes through
    /// [`StepStore::update_step_field`] with [`StepField::CallbackStepCode`].
    pub fn bind_callback(&mut self, source: &StepCode, target: &StepCode) -> bool {
        if source == target {
            return false;
        }
        let Some((index, step)) = self.workflow.step_by_code(source) else {
            return false;
        };
        if step
            .callback_step_code
            .as_ref()
            .is_some_and(|current| current != target)
        {
            return false;
        }
        if self.workflow.step_by_code(target).is_none() {
            return false;
        }
        self.update_step_field(index, StepField::CallbackStepCode, target.as_str())
    }

    /// Runs `schema` over the current workflow.
    ///
    /// On failure the error map is replaced by the schema's, the editing pointer moves
    /// to the first step with an error, and the map is returned inside the error. On
    /// success the error map is cleared and the wire payload is returned, bound to
    /// `kiosk_version_id` when given.
    pub fn submit(
        &mut self,
        schema: &dyn ValidationSchema,
        kiosk_version_id: Option<&str>,
    ) -> Result<WorkflowPayload, SubmissionError> {
        match schema.validate(&self.workflow) {
            Some(errors) if !errors.is_empty() => {
                let first_step = errors.first_step_index();
                tracing::info!(
                    errors = errors.len(),
                    first_step = ?first_step,
                    "workflow submission rejected"
                );
                if first_step.is_some() {
                    self.editing = first_step;
                }
                self.errors = errors.clone();
                self.refresh();
                Err(SubmissionError::Invalid { errors, first_step })
            }
            _ => {
                self.errors.clear();
                self.refresh();
                let payload = to_payload(&self.workflow, kiosk_version_id);
                tracing::info!(
                    name = %payload.name,
                    steps = payload.steps.len(),
                    "workflow ready for submission"
                );
                Ok(payload)
            }
        }
    }

    /// Re-derives the graph. Called after every change to steps or errors.
    pub(crate) fn refresh(&mut self) {
        self.graph = derive_graph(&self.workflow.steps, &self.errors, &self.layout);
    }

    /// Applies `f` to a private copy of the workflow and bumps the version. Callers
    /// re-derive the graph once their bookkeeping is done.
    fn commit<R>(&mut self, operation: &'static str, f: impl FnOnce(&mut Workflow) -> R) -> R {
        let result = f(Arc::make_mut(&mut self.workflow));
        self.version += 1;
        tracing::trace!(operation, version = self.version, "committed mutation");
        result
    }

    fn taken_codes(&self) -> AHashSet<String> {
        self.workflow
            .steps
            .iter()
            .map(|s| s.step_code.to_string())
            .collect()
    }

    fn seed_if_empty(&mut self) {
        if self.workflow.steps.is_empty() {
            let code = unique_code(self.codes.as_mut(), &AHashSet::new());
            Arc::make_mut(&mut self.workflow)
                .steps
                .push(Step::new(code, 1));
        }
    }
}

fn retag(operand: &mut Operand, kind: OperandKind) {
    let current = std::mem::replace(operand, Operand::Literal(String::new()));
    *operand = current.with_kind(kind);
}

fn revalue(operand: &mut Operand, value: String) {
    let current = std::mem::replace(operand, Operand::Literal(String::new()));
    *operand = current.with_value(value);
}

/// Gives every step a non-empty code unique within `steps`. The first holder of a
/// duplicated code keeps it. Returns how many steps were recoded.
fn repair_step_codes(steps: &mut [Step], codes: &mut dyn CodeGenerator) -> usize {
    let mut taken: AHashSet<String> = AHashSet::with_capacity(steps.len());
    let mut needs_code = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        if step.step_code.is_empty() || !taken.insert(step.step_code.to_string()) {
            needs_code.push(index);
        }
    }
    for &index in &needs_code {
        let code = unique_code(codes, &taken);
        taken.insert(code.to_string());
        steps[index].step_code = code;
    }
    needs_code.len()
}
