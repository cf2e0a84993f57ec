//! Step handlers re-invoked by the workflow engine.
//!
//! The workflow engine hands the previous `WorkflowState` back on every
//! invocation. Each step does one bounded unit of work and returns the next
//! state; looping, backoff and retries belong to the workflow engine.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LakeqError, Result};
use crate::query::{ExecutionHandle, ExecutionStatus, QueryExecutor, QueryRequest, StatusPoller};

/// State threaded through every step of a query workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    #[serde(flatten)]
    pub request: QueryRequest,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_max_page_size: Option<usize>,

    /// Set once the query has been submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<ExecutionHandle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,

    /// True once `status` is terminal.
    #[serde(default)]
    pub done: bool,
}

impl WorkflowState {
    /// Creates the initial state for a not-yet-submitted query.
    pub fn new(request: QueryRequest, results_max_page_size: Option<usize>) -> Self {
        Self {
            request,
            results_max_page_size,
            query_id: None,
            status: None,
            done: false,
        }
    }

    fn observe(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self.done = status.is_terminal();
        self
    }
}

/// Kickoff and poll steps built on the executor and poller.
#[derive(Clone)]
pub struct WorkflowSteps {
    executor: QueryExecutor,
    poller: StatusPoller,
}

impl WorkflowSteps {
    pub fn new(executor: QueryExecutor, poller: StatusPoller) -> Self {
        Self { executor, poller }
    }

    /// Submits the query, waits briefly and checks its status once.
    ///
    /// Status only: rows are left for the caller to fetch once the workflow is done.
    ///
    /// Once submitted, the query id is kept even if the check fails, so a
    /// retried workflow polls the existing execution instead of resubmitting.
    pub async fn kickoff(&self, state: WorkflowState) -> Result<WorkflowState> {
        if state.query_id.is_some() {
            return Err(LakeqError::internal("kickoff called on a submitted query"));
        }

        let handle = self.executor.submit(state.request.clone()).await?;
        let mut state = WorkflowState {
            query_id: Some(handle.clone()),
            ..state
        };

        match self.executor.status_after_wait(&handle).await {
            Ok(status) => Ok(state.observe(status)),
            Err(e) if e.is_unknown_state() => Err(e),
            Err(e) => {
                warn!(query_id = %handle, error = %e, "Status check after kickoff failed; will poll");
                state.status = Some(ExecutionStatus::Running);
                Ok(state)
            }
        }
    }

    /// Checks the status of a submitted query.
    pub async fn poll(&self, state: WorkflowState) -> Result<WorkflowState> {
        let handle = state
            .query_id
            .clone()
            .ok_or_else(|| LakeqError::internal("poll called before the query was submitted"))?;

        let status = self.poller.get_status(&handle).await?;
        if status.is_terminal() {
            info!(query_id = %handle, %status, "Query workflow reached terminal status");
        }
        Ok(state.observe(status))
    }

    /// Runs whichever step the state calls for next.
    pub async fn advance(&self, state: WorkflowState) -> Result<WorkflowState> {
        if state.done {
            return Ok(state);
        }
        match state.query_id {
            None => self.kickoff(state).await,
            Some(_) => self.poll(state).await,
        }
    }
}
