//! HTTP workflow engine client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::WorkflowConfig;
use crate::error::{LakeqError, Result};
use crate::workflow::WorkflowEngine;

/// Workflow engine client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWorkflowEngine {
    base_url: String,
    client: Client,
}

impl HttpWorkflowEngine {
    /// Creates a client for the engine at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LakeqError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Creates a client from the workflow section of the configuration.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.timeout_secs)
    }

    fn executions_url(&self) -> String {
        format!("{}/v1/executions", self.base_url)
    }
}

#[async_trait]
impl WorkflowEngine for HttpWorkflowEngine {
    async fn start_run(&self, target_arn: &str, run_name: &str, input: &str) -> Result<String> {
        let request = StartExecutionRequest {
            state_machine_arn: target_arn,
            name: run_name,
            input,
        };

        debug!(target = %target_arn, run_name = %run_name, "Starting workflow execution");
        let response = self
            .client
            .post(self.executions_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LakeqError::remote("Request to workflow engine timed out")
                } else {
                    LakeqError::remote(format!("Failed to start workflow execution: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LakeqError::remote(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LakeqError::remote(format!(
                "Workflow engine error ({}): {}",
                status, body
            )));
        }

        let started: StartExecutionResponse = serde_json::from_str(&body)
            .map_err(|e| LakeqError::remote(format!("Failed to parse response: {}", e)))?;
        Ok(started.execution_arn)
    }
}

// Workflow API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionRequest<'a> {
    state_machine_arn: &'a str,
    name: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionResponse {
    execution_arn: String,
}
