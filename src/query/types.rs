//! Query lifecycle types for lakeq.
//!
//! Defines the request, handle, status and result page structures shared by
//! the executor, poller and pager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A SQL query to run against a named logical database.
///
/// Immutable once built; consumed by whichever entry point receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Logical database the SQL runs against.
    pub database_name: String,

    /// SQL text.
    pub sql: String,

    /// Opaque storage path where the engine writes results.
    pub results_location: String,
}

impl QueryRequest {
    /// Creates a new query request.
    pub fn new(
        database_name: impl Into<String>,
        sql: impl Into<String>,
        results_location: impl Into<String>,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            sql: sql.into(),
            results_location: results_location.into(),
        }
    }
}

/// Opaque identifier issued by the remote engine for one execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionHandle(String);

impl ExecutionHandle {
    /// Wraps a query id issued by the engine.
    pub fn new(query_id: impl Into<String>) -> Self {
        Self(query_id.into())
    }

    /// Returns the raw query id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the handle, returning the raw query id.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque cursor identifying where the next result page begins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a pagination cursor issued by the engine.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw cursor.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution status as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns true once no further transitions can occur.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell. The engine returns every value pre-stringified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub value: String,
}

impl Column {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// An ordered sequence of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<Column>,
}

impl Row {
    /// Returns the cell values in column order.
    pub fn values(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.value.as_str()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(Column::new).collect(),
        }
    }
}

/// Normalizes a caller-supplied page bound. Zero means "no bound".
pub fn page_bound(max_page_size: Option<usize>) -> Option<usize> {
    max_page_size.filter(|&n| n > 0)
}

/// One page of results.
///
/// `continuation_token` is the sole termination signal for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultPage {
    /// Rows in the order the engine returned them.
    pub rows: Vec<Row>,

    /// Number of rows in this page.
    pub row_count: usize,

    /// Cursor for the next page, absent when there are no more.
    pub continuation_token: Option<ContinuationToken>,
}

impl ResultPage {
    /// Creates an empty page with no continuation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if another page may follow.
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }
}
