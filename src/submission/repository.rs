use super::{IntoWorkflow, WorkflowPayload};
use crate::error::RepositoryError;
use crate::workflow::Workflow;
use ahash::AHashMap;

/// A workflow as returned by the persistence API.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredWorkflow {
    pub id: String,
    pub workflow: Workflow,
}

/// Read/write access to persisted workflows. Implementations live outside this crate,
/// typically wrapping an HTTP client.
pub trait WorkflowRepository {
    fn get(&self, workflow_id: &str) -> Result<StoredWorkflow, RepositoryError>;
    fn create(&mut self, payload: WorkflowPayload) -> Result<StoredWorkflow, RepositoryError>;
    fn update(
        &mut self,
        workflow_id: &str,
        payload: WorkflowPayload,
    ) -> Result<StoredWorkflow, RepositoryError>;
}

/// Keeps payloads in memory exactly as they would be sent over the wire.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: AHashMap<String, WorkflowPayload>,
    next_id: u64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn read(&self, workflow_id: &str) -> Result<StoredWorkflow, RepositoryError> {
        let payload = self
            .records
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(workflow_id.to_string()))?;
        Ok(StoredWorkflow {
            id: workflow_id.to_string(),
            workflow: payload.into_workflow()?,
        })
    }
}

impl WorkflowRepository for InMemoryRepository {
    fn get(&self, workflow_id: &str) -> Result<StoredWorkflow, RepositoryError> {
        self.read(workflow_id)
    }

    fn create(&mut self, payload: WorkflowPayload) -> Result<StoredWorkflow, RepositoryError> {
        self.next_id += 1;
        let id = format!("wf-{}", self.next_id);
        self.records.insert(id.clone(), payload);
        self.read(&id)
    }

    fn update(
        &mut self,
        workflow_id: &str,
        payload: WorkflowPayload,
    ) -> Result<StoredWorkflow, RepositoryError> {
        let record = self
            .records
            .get_mut(workflow_id)
            .ok_or_else(|| RepositoryError::NotFound(workflow_id.to_string()))?;
        *record = payload;
        self.read(workflow_id)
    }
}
