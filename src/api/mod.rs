//! Exposed operation surface for lakeq.
//!
//! Wraps the executor, poller, pager and workflow notifier in the five
//! request/response operations. The four business operations never hand
//! engine error text to callers: failures come back as status `failed` with a
//! fixed message, and the cause is logged. An engine state outside the known
//! vocabulary is returned as `LakeqError::UnknownState` instead.

pub mod models;

pub use models::{
    ExecuteAsyncQueryInput, ExecuteAsyncQueryNotifyInput, ExecuteAsyncQueryNotifyOutput,
    ExecuteAsyncQueryOutput, ExecuteQueryInput, ExecuteQueryOutput, FailedOutput,
    GetQueryResultsInput, GetQueryResultsOutput, GetQueryStatusInput, GetQueryStatusOutput,
};

use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use tracing::error;

use crate::config::Config;
use crate::engine::{self, QueryEngine};
use crate::error::{LakeqError, Result};
use crate::query::{
    page_bound, ExecutionHandle, ExecutionStatus, QueryExecutor, QueryRequest, ResultPager,
    StatusPoller,
};
use crate::workflow::mock::{RecordingWorkflowEngine, StaticIdentity};
use crate::workflow::{
    CallerIdentity, ConfigIdentityResolver, HttpWorkflowEngine, WorkflowNotifier, WorkflowSteps,
};

pub const EXECUTE_QUERY_FAILED: &str = "ExecuteQuery failed";
pub const EXECUTE_ASYNC_QUERY_FAILED: &str = "ExecuteAsyncQuery failed";
pub const GET_QUERY_STATUS_FAILED: &str = "GetQueryStatus failed";
pub const GET_QUERY_RESULTS_FAILED: &str = "GetQueryResults failed";

/// The query API. Holds no per-execution state; every call is self-contained.
#[derive(Clone)]
pub struct DatabaseApi {
    executor: QueryExecutor,
    poller: StatusPoller,
    pager: ResultPager,
    notifier: WorkflowNotifier,
    results_location: String,
}

impl DatabaseApi {
    /// Creates an API over the given engine and workflow notifier.
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        notifier: WorkflowNotifier,
        results_location: impl Into<String>,
    ) -> Self {
        Self {
            executor: QueryExecutor::new(engine.clone()),
            poller: StatusPoller::new(engine.clone()),
            pager: ResultPager::new(engine),
            notifier,
            results_location: results_location.into(),
        }
    }

    /// Builds the API from configuration.
    ///
    /// With `use_mock`, both the query engine and the workflow engine are in-memory fakes.
    pub fn from_config(config: &Config, use_mock: bool) -> Result<Self> {
        let engine = engine::connect(&config.engine, use_mock)?;
        let state_machine = config.workflow.state_machine_name.clone();

        let notifier = if use_mock {
            WorkflowNotifier::new(
                Arc::new(RecordingWorkflowEngine::new()),
                Arc::new(StaticIdentity::new(CallerIdentity::new(
                    "000000000000",
                    "local",
                ))),
                state_machine,
            )
        } else {
            WorkflowNotifier::new(
                Arc::new(HttpWorkflowEngine::from_config(&config.workflow)?),
                Arc::new(ConfigIdentityResolver::from(&config.workflow)),
                state_machine,
            )
        };

        Ok(Self::new(engine, notifier, config.results_location.clone())
            .with_minimal_wait(config.engine.minimal_query_wait()))
    }

    /// Sets the ExecuteAsyncQuery short wait.
    pub fn with_minimal_wait(mut self, wait: Duration) -> Self {
        self.executor = self.executor.with_minimal_wait(wait);
        self
    }

    /// Returns the workflow step handlers sharing this API's engine.
    pub fn steps(&self) -> WorkflowSteps {
        WorkflowSteps::new(self.executor.clone(), self.poller.clone())
    }

    fn request(&self, database_name: String, sql: String) -> QueryRequest {
        QueryRequest {
            database_name,
            sql,
            results_location: self.results_location.clone(),
        }
    }

    /// Runs a query to completion and returns its first page.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> Result<ExecuteQueryOutput> {
        let request = self.request(input.database_name, input.sql);
        match self.executor.execute_sync(request).await {
            Ok(outcome) => Ok(ExecuteQueryOutput::from_page(outcome.status, outcome.page)),
            Err(e) => boundary(EXECUTE_QUERY_FAILED, e, ExecuteQueryOutput::default()),
        }
    }

    /// Submits a query, waits briefly and reports its status, with rows if it already finished.
    pub async fn execute_async_query(
        &self,
        input: ExecuteAsyncQueryInput,
    ) -> Result<ExecuteAsyncQueryOutput> {
        let request = self.request(input.database_name, input.sql);

        let execution = match self
            .executor
            .execute_async(request, input.results_max_page_size)
            .await
        {
            Ok(execution) => execution,
            Err(e) => {
                return boundary(
                    EXECUTE_ASYNC_QUERY_FAILED,
                    e,
                    ExecuteAsyncQueryOutput::default(),
                )
            }
        };

        let mut output = ExecuteAsyncQueryOutput {
            query_id: Some(execution.handle),
            ..Default::default()
        };
        match execution.check {
            Ok(check) => {
                output.status = check.status;
                if let Some(page) = check.page {
                    output.set_page(page);
                }
                Ok(output)
            }
            Err(e) => boundary(EXECUTE_ASYNC_QUERY_FAILED, e, output),
        }
    }

    /// Returns the current status of a query.
    pub async fn get_query_status(
        &self,
        input: GetQueryStatusInput,
    ) -> Result<GetQueryStatusOutput> {
        match self.poller.get_status(&input.query_id).await {
            Ok(status) => Ok(GetQueryStatusOutput {
                status,
                error_message: None,
            }),
            Err(e) => boundary(GET_QUERY_STATUS_FAILED, e, GetQueryStatusOutput::default()),
        }
    }

    /// Returns one page of results, continuing from `pagination_token` if given.
    pub async fn get_query_results(
        &self,
        input: GetQueryResultsInput,
    ) -> Result<GetQueryResultsOutput> {
        match self
            .pager
            .fetch_page(
                &input.query_id,
                input.pagination_token.as_ref(),
                input.results_max_page_size,
            )
            .await
        {
            Ok(fetched) => Ok(GetQueryResultsOutput::from_page(fetched.status, fetched.page)),
            Err(e) => boundary(GET_QUERY_RESULTS_FAILED, e, GetQueryResultsOutput::default()),
        }
    }

    /// Drains every page of a finished query into one output.
    ///
    /// Pages are fetched serially; the returned output never carries a token.
    pub async fn get_all_query_results(
        &self,
        query_id: ExecutionHandle,
        results_max_page_size: Option<usize>,
    ) -> Result<GetQueryResultsOutput> {
        let status = match self.poller.get_status(&query_id).await {
            Ok(status) => status,
            Err(e) => {
                return boundary(GET_QUERY_RESULTS_FAILED, e, GetQueryResultsOutput::default())
            }
        };
        if status != ExecutionStatus::Succeeded {
            return Ok(GetQueryResultsOutput {
                status,
                ..Default::default()
            });
        }

        let drained: Result<Vec<_>> = self
            .pager
            .pages(query_id, results_max_page_size)
            .try_collect()
            .await;
        match drained {
            Ok(pages) => {
                let mut output = GetQueryResultsOutput {
                    status,
                    ..Default::default()
                };
                for page in pages {
                    output.num_rows += page.row_count;
                    output.rows.extend(page.rows);
                }
                Ok(output)
            }
            Err(e) => boundary(GET_QUERY_RESULTS_FAILED, e, GetQueryResultsOutput::default()),
        }
    }

    /// Starts a durable workflow run for the query and returns its id.
    ///
    /// Unlike the other operations, every failure here is returned as an error.
    pub async fn execute_async_query_notify(
        &self,
        input: ExecuteAsyncQueryNotifyInput,
    ) -> Result<ExecuteAsyncQueryNotifyOutput> {
        let max_page_size = page_bound(input.results_max_page_size);
        let request = self.request(input.database_name, input.sql);
        let workflow_id = self
            .notifier
            .start_workflow(request, max_page_size)
            .await
            .map_err(|e| {
                error!(error = %e, "ExecuteAsyncQueryNotify failed");
                e
            })?;
        Ok(ExecuteAsyncQueryNotifyOutput { workflow_id })
    }
}

/// Translates an error into the caller-safe failure shape.
///
/// Unknown engine states are passed through as errors so they stay distinct
/// from ordinary failed executions.
fn boundary<T: FailedOutput>(operation_message: &str, err: LakeqError, mut output: T) -> Result<T> {
    if err.is_unknown_state() {
        error!(operation = operation_message, error = %err, "Engine reported an unknown execution state");
        return Err(err);
    }
    error!(operation = operation_message, category = err.category(), error = %err, "Operation failed");
    output.mark_failed(operation_message);
    Ok(output)
}
