//! Durable-workflow hand-off for lakeq.
//!
//! Starts a workflow run per async query and provides the step handlers that
//! the workflow engine re-invokes until the query is terminal. lakeq never
//! waits on the run itself.

mod http;
mod identity;
pub mod mock;
pub mod steps;

pub use http::HttpWorkflowEngine;
pub use identity::{CallerIdentity, ConfigIdentityResolver};
pub use steps::{WorkflowState, WorkflowSteps};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::query::QueryRequest;

/// Trait for the workflow engine's "start execution" contract.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Starts a run of `target_arn` named `run_name` with a JSON input, returning the run id.
    async fn start_run(&self, target_arn: &str, run_name: &str, input: &str) -> Result<String>;
}

/// Trait for resolving the ambient account and region at call time.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self) -> Result<CallerIdentity>;
}

/// Identifier of a started workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowRun(String);

impl WorkflowRun {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self(run_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the addressable target for a state machine.
pub fn state_machine_arn(identity: &CallerIdentity, state_machine_name: &str) -> String {
    format!(
        "arn:aws:states:{}:{}:stateMachine:{}",
        identity.region, identity.account, state_machine_name
    )
}

/// Hands query requests to the workflow engine as new runs.
#[derive(Clone)]
pub struct WorkflowNotifier {
    engine: Arc<dyn WorkflowEngine>,
    identity: Arc<dyn IdentityResolver>,
    state_machine_name: String,
}

impl WorkflowNotifier {
    pub fn new(
        engine: Arc<dyn WorkflowEngine>,
        identity: Arc<dyn IdentityResolver>,
        state_machine_name: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            identity,
            state_machine_name: state_machine_name.into(),
        }
    }

    /// Starts a uniquely named run whose input is the initial workflow state.
    ///
    /// Fire-and-forget: returns as soon as the engine accepts the run.
    pub async fn start_workflow(
        &self,
        request: QueryRequest,
        results_max_page_size: Option<usize>,
    ) -> Result<WorkflowRun> {
        let state = WorkflowState::new(request, results_max_page_size);
        let input = serde_json::to_string(&state)?;

        let identity = self.identity.resolve().await?;
        let target = state_machine_arn(&identity, &self.state_machine_name);
        let run_name = uuid::Uuid::new_v4().to_string();

        let run_id = self.engine.start_run(&target, &run_name, &input).await?;
        info!(
            workflow_id = %run_id,
            run_name = %run_name,
            database = %state.request.database_name,
            "Started query workflow"
        );
        Ok(WorkflowRun::new(run_id))
    }
}
