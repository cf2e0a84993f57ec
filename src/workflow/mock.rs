//! Mock workflow engine and identity for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{LakeqError, Result};
use crate::workflow::{CallerIdentity, IdentityResolver, WorkflowEngine};

/// A run accepted by the recording engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedRun {
    pub target_arn: String,
    pub run_name: String,
    pub input: String,
}

/// Workflow engine that records every start request and never runs anything.
#[derive(Debug, Default)]
pub struct RecordingWorkflowEngine {
    runs: Mutex<Vec<StartedRun>>,
    fail: bool,
}

impl RecordingWorkflowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that rejects every start request.
    pub fn failing() -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns the runs started so far, in order.
    pub fn runs(&self) -> Vec<StartedRun> {
        self.runs.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WorkflowEngine for RecordingWorkflowEngine {
    async fn start_run(&self, target_arn: &str, run_name: &str, input: &str) -> Result<String> {
        if self.fail {
            return Err(LakeqError::remote("mock workflow engine rejected the run"));
        }

        let mut runs = self
            .runs
            .lock()
            .map_err(|_| LakeqError::internal("mock workflow state poisoned"))?;
        runs.push(StartedRun {
            target_arn: target_arn.to_string(),
            run_name: run_name.to_string(),
            input: input.to_string(),
        });

        let execution_arn = target_arn.replacen(":stateMachine:", ":execution:", 1);
        Ok(format!("{}:{}", execution_arn, run_name))
    }
}

/// Identity resolver returning a fixed identity, or none at all.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    identity: Option<CallerIdentity>,
}

impl StaticIdentity {
    pub fn new(identity: CallerIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Creates a resolver that behaves as if no account/region is available.
    pub fn missing() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self) -> Result<CallerIdentity> {
        self.identity
            .clone()
            .ok_or_else(|| LakeqError::identity("no caller identity available"))
    }
}
