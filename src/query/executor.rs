//! Query submission and execution.
//!
//! Provides the synchronous "run until terminal" path and the async kickoff
//! path (submit, wait briefly, check once). Neither path holds anything but
//! the execution handle while it waits.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{ExecutionMetadata, QueryEngine};
use crate::error::{LakeqError, Result};
use crate::query::collector::collect_page;
use crate::query::status::map_metadata;
use crate::query::{page_bound, ExecutionHandle, ExecutionStatus, QueryRequest, ResultPage};

/// Default pause before the single status check of the async path.
pub const DEFAULT_MINIMAL_QUERY_WAIT: Duration = Duration::from_secs(4);

/// Query executor that owns submission and the sync/async run paths.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn QueryEngine>,
    minimal_query_wait: Duration,
}

impl QueryExecutor {
    /// Creates a new query executor using the default short wait.
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            minimal_query_wait: DEFAULT_MINIMAL_QUERY_WAIT,
        }
    }

    /// Sets how long the async path sleeps before checking status.
    ///
    /// Only affects how many round-trips a caller needs, never the outcome contract.
    pub fn with_minimal_wait(mut self, wait: Duration) -> Self {
        self.minimal_query_wait = wait;
        self
    }

    /// Returns the configured short wait.
    pub fn minimal_wait(&self) -> Duration {
        self.minimal_query_wait
    }

    /// Submits the query without waiting.
    pub async fn submit(&self, request: QueryRequest) -> Result<ExecutionHandle> {
        let handle = self.engine.submit(&request).await?;
        info!(
            query_id = %handle,
            database = %request.database_name,
            "Query submitted"
        );
        Ok(handle)
    }

    /// Submits the query and blocks until it reaches a terminal state.
    ///
    /// On success the first page is collected with engine defaults (no caller
    /// bound). Any non-success terminal state is returned as `QueryFailed`.
    pub async fn execute_sync(&self, request: QueryRequest) -> Result<SyncExecution> {
        let handle = self.submit(request).await?;

        let metadata = self.engine.wait(&handle).await?;
        let status = map_metadata(&metadata)?;
        if status != ExecutionStatus::Succeeded {
            warn!(
                query_id = %handle,
                state = %metadata.state,
                reason = ?metadata.state_change_reason,
                "Query did not succeed"
            );
            return Err(LakeqError::QueryFailed {
                query_id: handle.into_inner(),
                state: metadata.state,
            });
        }

        let raw = self.engine.get_result_page(&metadata, None, None).await?;
        let page = collect_page(raw, None);
        debug!(query_id = %handle, rows = page.row_count, "Collected first page");

        Ok(SyncExecution {
            handle,
            status,
            page,
        })
    }

    /// Sleeps the short wait, then fetches execution metadata once.
    async fn metadata_after_wait(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<(ExecutionMetadata, ExecutionStatus)> {
        if !self.minimal_query_wait.is_zero() {
            tokio::time::sleep(self.minimal_query_wait).await;
        }

        let metadata = self.engine.get_status(handle).await?;
        let status = map_metadata(&metadata)?;
        debug!(query_id = %handle, state = %metadata.state, %status, "Checked status after short wait");
        Ok((metadata, status))
    }

    /// Sleeps the short wait, then checks status only. Never reads results.
    pub async fn status_after_wait(&self, handle: &ExecutionHandle) -> Result<ExecutionStatus> {
        let (_, status) = self.metadata_after_wait(handle).await?;
        Ok(status)
    }

    /// Sleeps the short wait, then performs exactly one status check.
    ///
    /// On terminal success the first page, bounded by `max_page_size`, is
    /// returned inline. A zero `max_page_size` means no bound.
    pub async fn check_after_wait(
        &self,
        handle: &ExecutionHandle,
        max_page_size: Option<usize>,
    ) -> Result<AsyncCheck> {
        let max_page_size = page_bound(max_page_size);
        let (metadata, status) = self.metadata_after_wait(handle).await?;

        let page = if status == ExecutionStatus::Succeeded {
            let raw = self
                .engine
                .get_result_page(&metadata, None, max_page_size)
                .await?;
            Some(collect_page(raw, max_page_size))
        } else {
            None
        };

        Ok(AsyncCheck { status, page })
    }

    /// Submits the query, waits briefly and checks its status once.
    ///
    /// Only a failed submission is an error here. Once a handle exists it is
    /// always returned, with the outcome of the check alongside it.
    pub async fn execute_async(
        &self,
        request: QueryRequest,
        max_page_size: Option<usize>,
    ) -> Result<AsyncExecution> {
        let handle = self.submit(request).await?;
        let check = self.check_after_wait(&handle, max_page_size).await;
        Ok(AsyncExecution { handle, check })
    }
}

/// Outcome of a synchronous execution.
#[derive(Debug, Clone)]
pub struct SyncExecution {
    pub handle: ExecutionHandle,
    pub status: ExecutionStatus,
    pub page: ResultPage,
}

/// Outcome of the single post-wait status check.
#[derive(Debug, Clone)]
pub struct AsyncCheck {
    pub status: ExecutionStatus,
    /// First page, present only on terminal success.
    pub page: Option<ResultPage>,
}

/// Outcome of an async kickoff.
#[derive(Debug)]
pub struct AsyncExecution {
    pub handle: ExecutionHandle,
    /// The post-wait check. A failure here does not undo the submission.
    pub check: Result<AsyncCheck>,
}
