//! Request and response models for the exposed operations.

use serde::{Deserialize, Serialize};

use crate::query::{ContinuationToken, ExecutionHandle, ExecutionStatus, ResultPage, Row};
use crate::workflow::WorkflowRun;

/// Outputs that can be turned into the fixed, caller-safe failure shape.
pub trait FailedOutput {
    fn mark_failed(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryInput {
    pub database_name: String,
    pub sql: String,
}

/// ExecuteQuery answers with the same shape as GetQueryResults.
pub type ExecuteQueryOutput = GetQueryResultsOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAsyncQueryInput {
    pub database_name: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_max_page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAsyncQueryOutput {
    /// Present whenever submission succeeded, even if the later check failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<ExecutionHandle>,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub num_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<ContinuationToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ExecuteAsyncQueryOutput {
    pub fn set_page(&mut self, page: ResultPage) {
        self.num_rows = page.row_count;
        self.rows = page.rows;
        self.pagination_token = page.continuation_token;
    }
}

impl FailedOutput for ExecuteAsyncQueryOutput {
    fn mark_failed(&mut self, message: &str) {
        self.status = ExecutionStatus::Failed;
        self.rows.clear();
        self.num_rows = 0;
        self.pagination_token = None;
        self.error_message = Some(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryStatusInput {
    pub query_id: ExecutionHandle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryStatusOutput {
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FailedOutput for GetQueryStatusOutput {
    fn mark_failed(&mut self, message: &str) {
        self.status = ExecutionStatus::Failed;
        self.error_message = Some(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryResultsInput {
    pub query_id: ExecutionHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<ContinuationToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_max_page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryResultsOutput {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub num_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<ContinuationToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GetQueryResultsOutput {
    /// Builds an output from a status and the page fetched with it.
    pub fn from_page(status: ExecutionStatus, page: ResultPage) -> Self {
        Self {
            status,
            num_rows: page.row_count,
            rows: page.rows,
            pagination_token: page.continuation_token,
            error_message: None,
        }
    }
}

impl FailedOutput for GetQueryResultsOutput {
    fn mark_failed(&mut self, message: &str) {
        self.status = ExecutionStatus::Failed;
        self.rows.clear();
        self.num_rows = 0;
        self.pagination_token = None;
        self.error_message = Some(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAsyncQueryNotifyInput {
    pub database_name: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_max_page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAsyncQueryNotifyOutput {
    pub workflow_id: WorkflowRun,
}
