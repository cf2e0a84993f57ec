//! Mock query engine for testing.
//!
//! Provides an in-memory engine with scripted state progressions, fixed result
//! sets and injectable failures, for headless testing and `--mock-engine` runs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::engine::{ExecutionMetadata, QueryEngine, RawPage, RawRow, RemoteState};
use crate::error::{LakeqError, Result};
use crate::query::{ContinuationToken, ExecutionHandle, QueryRequest};

/// Largest page the mock engine hands out, matching the remote engine's cap.
pub const MOCK_MAX_PAGE_SIZE: usize = 1000;

/// Engine primitive that should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Submit,
    Wait,
    Status,
    Results,
}

/// A mock engine whose executions follow a scripted sequence of states.
///
/// Each status check advances an execution one step through the script; the
/// last state sticks. The blocking wait jumps straight to the last state.
pub struct MockQueryEngine {
    inner: Mutex<MockState>,
}

struct MockState {
    next_id: u64,
    states: Vec<String>,
    rows: Option<Vec<RawRow>>,
    failure: Option<FailurePoint>,
    submissions: Vec<QueryRequest>,
    executions: HashMap<String, MockExecution>,
}

struct MockExecution {
    pending: VecDeque<String>,
    current: String,
    rows: Vec<RawRow>,
}

impl MockExecution {
    fn advance(&mut self) -> &str {
        if let Some(next) = self.pending.pop_front() {
            self.current = next;
        }
        &self.current
    }

    fn finish(&mut self) -> &str {
        if let Some(last) = self.pending.pop_back() {
            self.pending.clear();
            self.current = last;
        }
        &self.current
    }
}

impl MockQueryEngine {
    /// Creates a mock engine whose queries succeed immediately.
    ///
    /// Without explicit rows, every query returns one row echoing its SQL.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockState {
                next_id: 0,
                states: vec![RemoteState::Succeeded.as_str().to_string()],
                rows: None,
                failure: None,
                submissions: Vec::new(),
                executions: HashMap::new(),
            }),
        }
    }

    /// Sets the states every new execution walks through, one per status check.
    pub fn with_states<I, S>(self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        if let Ok(mut state) = self.inner.lock() {
            if !states.is_empty() {
                state.states = states;
            }
        }
        self
    }

    /// Sets the result rows every successful execution returns.
    pub fn with_rows(self, rows: Vec<RawRow>) -> Self {
        if let Ok(mut state) = self.inner.lock() {
            state.rows = Some(rows);
        }
        self
    }

    /// Generates `count` single-column rows holding "0", "1", ...
    pub fn with_numbered_rows(self, count: usize) -> Self {
        let rows = (0..count)
            .map(|i| RawRow::from_iter([i.to_string()]))
            .collect();
        self.with_rows(rows)
    }

    /// Makes the given primitive fail with a remote error.
    pub fn failing_at(self, point: FailurePoint) -> Self {
        if let Ok(mut state) = self.inner.lock() {
            state.failure = Some(point);
        }
        self
    }

    /// Returns every request submitted so far, in order.
    pub fn submissions(&self) -> Vec<QueryRequest> {
        self.state()
            .map(|s| s.submissions.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>> {
        self.inner
            .lock()
            .map_err(|_| LakeqError::internal("mock engine state poisoned"))
    }

    fn check_failure(state: &MockState, point: FailurePoint) -> Result<()> {
        if state.failure == Some(point) {
            return Err(LakeqError::remote(format!(
                "mock engine failure during {:?}",
                point
            )));
        }
        Ok(())
    }
}

impl Default for MockQueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_query(query_id: &str) -> LakeqError {
    LakeqError::remote(format!("Query {} not found", query_id))
}

#[async_trait]
impl QueryEngine for MockQueryEngine {
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle> {
        let mut state = self.state()?;
        Self::check_failure(&state, FailurePoint::Submit)?;

        state.next_id += 1;
        let query_id = format!("mock-query-{:04}", state.next_id);

        let rows = state
            .rows
            .clone()
            .unwrap_or_else(|| vec![RawRow::from_iter([format!("Mock result for: {}", request.sql)])]);
        let pending: VecDeque<String> = state.states.iter().cloned().collect();
        state.executions.insert(
            query_id.clone(),
            MockExecution {
                pending,
                current: RemoteState::Queued.as_str().to_string(),
                rows,
            },
        );
        state.submissions.push(request.clone());

        Ok(ExecutionHandle::new(query_id))
    }

    async fn wait(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata> {
        let mut state = self.state()?;
        Self::check_failure(&state, FailurePoint::Wait)?;

        let execution = state
            .executions
            .get_mut(handle.as_str())
            .ok_or_else(|| unknown_query(handle.as_str()))?;
        Ok(ExecutionMetadata::new(handle.as_str(), execution.finish()))
    }

    async fn get_status(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata> {
        let mut state = self.state()?;
        Self::check_failure(&state, FailurePoint::Status)?;

        let execution = state
            .executions
            .get_mut(handle.as_str())
            .ok_or_else(|| unknown_query(handle.as_str()))?;
        Ok(ExecutionMetadata::new(handle.as_str(), execution.advance()))
    }

    async fn get_result_page(
        &self,
        metadata: &ExecutionMetadata,
        token: Option<&ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<RawPage> {
        let state = self.state()?;
        Self::check_failure(&state, FailurePoint::Results)?;

        let execution = state
            .executions
            .get(&metadata.query_id)
            .ok_or_else(|| unknown_query(&metadata.query_id))?;
        if RemoteState::parse(&execution.current) != Some(RemoteState::Succeeded) {
            return Err(LakeqError::remote(format!(
                "Query {} has not succeeded (state {})",
                metadata.query_id, execution.current
            )));
        }

        let start = match token {
            Some(token) => token.as_str().parse::<usize>().map_err(|_| {
                LakeqError::remote(format!("Invalid pagination token: {}", token))
            })?,
            None => 0,
        };
        let page_size = max_results
            .unwrap_or(MOCK_MAX_PAGE_SIZE)
            .min(MOCK_MAX_PAGE_SIZE);
        let total = execution.rows.len();
        let start = start.min(total);
        let end = (start + page_size).min(total);

        Ok(RawPage {
            rows: execution.rows[start..end].to_vec(),
            next_token: (end < total).then(|| end.to_string()),
        })
    }
}
