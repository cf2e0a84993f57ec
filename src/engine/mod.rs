//! Remote query engine abstraction for lakeq.
//!
//! Provides a trait-based interface over the data-lake engine's submit, wait,
//! status and result-page primitives, so the executor, poller and pager can
//! run against the HTTP client or an in-memory fake interchangeably.

mod http;
mod mock;

pub use http::{HttpEngineConfig, HttpQueryEngine};
pub use mock::{FailurePoint, MockQueryEngine};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::query::{ContinuationToken, ExecutionHandle, QueryRequest};

/// Execution states in the remote engine's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RemoteState {
    /// Returns the state as the engine spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses an engine state value. Returns None for values outside the vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the engine will not move this execution again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Execution metadata as reported by the engine.
///
/// `state` is kept raw so that values outside the known vocabulary reach the
/// status mapper intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    #[serde(rename = "queryExecutionId")]
    pub query_id: String,

    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_reason: Option<String>,
}

impl ExecutionMetadata {
    pub fn new(query_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            state: state.into(),
            state_change_reason: None,
        }
    }

    /// Returns the parsed state, if it is part of the known vocabulary.
    pub fn remote_state(&self) -> Option<RemoteState> {
        RemoteState::parse(&self.state)
    }
}

/// One page of rows exactly as the engine returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    pub rows: Vec<RawRow>,
    pub next_token: Option<String>,
}

/// A raw row: one optional string per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub data: Vec<Option<String>>,
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|v| Some(v.into())).collect(),
        }
    }
}

/// Trait defining the remote engine primitives lakeq consumes.
///
/// Every call is self-contained given its inputs; implementations hold no
/// per-execution session state on behalf of callers.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submits a query and returns the engine-issued handle.
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle>;

    /// Blocks until the execution reaches a terminal state.
    async fn wait(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata>;

    /// Fetches current execution metadata only.
    async fn get_status(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata>;

    /// Fetches exactly one page of results.
    async fn get_result_page(
        &self,
        metadata: &ExecutionMetadata,
        token: Option<&ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<RawPage>;
}

/// Creates an engine client for the given configuration.
///
/// `use_mock` selects the in-memory engine, for trying the CLI without a backend.
pub fn connect(config: &EngineConfig, use_mock: bool) -> Result<Arc<dyn QueryEngine>> {
    if use_mock {
        return Ok(Arc::new(MockQueryEngine::new()));
    }
    let client = HttpQueryEngine::new(HttpEngineConfig::from(config))?;
    Ok(Arc::new(client))
}
