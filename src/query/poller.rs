//! Status-only polling of an execution.

use std::sync::Arc;

use tracing::debug;

use crate::engine::QueryEngine;
use crate::error::Result;
use crate::query::status::map_metadata;
use crate::query::{ExecutionHandle, ExecutionStatus};

/// Fetches execution metadata and maps it, without touching result rows.
#[derive(Clone)]
pub struct StatusPoller {
    engine: Arc<dyn QueryEngine>,
}

impl StatusPoller {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Returns the current status of the execution.
    pub async fn get_status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatus> {
        let metadata = self.engine.get_status(handle).await?;
        let status = map_metadata(&metadata)?;
        debug!(query_id = %handle, state = %metadata.state, %status, "Polled status");
        Ok(status)
    }
}
