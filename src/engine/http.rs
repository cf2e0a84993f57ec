//! HTTP query engine client.
//!
//! Implements the QueryEngine trait against the engine's JSON API. The
//! blocking wait is a status poll with capped exponential backoff; nothing is
//! held between polls except the query id.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::EngineConfig;
use crate::engine::{ExecutionMetadata, QueryEngine, RawPage, RawRow};
use crate::error::{LakeqError, Result};
use crate::query::{ContinuationToken, ExecutionHandle, QueryRequest};

/// HTTP engine client configuration.
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// Base URL for the engine API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// First delay between wait polls.
    pub poll_initial: Duration,
    /// Upper bound on the delay between wait polls.
    pub poll_max: Duration,
}

impl HttpEngineConfig {
    /// Creates a new config with the given base URL and default timings.
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            base_url: base_url.into(),
            ..Self::from(&defaults)
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the wait poll backoff bounds.
    pub fn with_poll_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.poll_initial = initial;
        self.poll_max = max;
        self
    }
}

impl From<&EngineConfig> for HttpEngineConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            poll_initial: Duration::from_millis(config.wait_poll_initial_ms),
            poll_max: Duration::from_millis(config.wait_poll_max_ms),
        }
    }
}

/// Remote engine client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpQueryEngine {
    config: HttpEngineConfig,
    base: Url,
    client: Client,
}

impl HttpQueryEngine {
    /// Creates a new engine client with the given configuration.
    pub fn new(config: HttpEngineConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            LakeqError::config(format!("Invalid engine URL '{}': {}", config.base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(LakeqError::config(format!(
                "Engine URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LakeqError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LakeqError::config("Engine URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn queries_url(&self) -> Result<Url> {
        self.endpoint(&["v1", "queries"])
    }

    fn query_url(&self, query_id: &str) -> Result<Url> {
        self.endpoint(&["v1", "queries", checked_query_id(query_id)?])
    }

    fn results_url(&self, query_id: &str) -> Result<Url> {
        self.endpoint(&["v1", "queries", checked_query_id(query_id)?, "results"])
    }

    /// Returns the delay to use after `current`.
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.config.poll_max)
    }
}

/// Rejects ids that cannot stand as a single path segment.
fn checked_query_id(query_id: &str) -> Result<&str> {
    // Dot segments are dropped by URL normalization
    match query_id {
        "" | "." | ".." => Err(LakeqError::remote(format!(
            "Invalid query id '{}'",
            query_id
        ))),
        _ => Ok(query_id),
    }
}

fn send_error(e: reqwest::Error) -> LakeqError {
    if e.is_timeout() {
        LakeqError::remote("Request to query engine timed out")
    } else if e.is_connect() {
        LakeqError::remote(format!("Failed to connect to query engine: {}", e))
    } else {
        LakeqError::remote(format!("Request failed: {}", e))
    }
}

/// Reads the body and decodes it, classifying non-2xx responses.
///
/// `rejects_as_submission` turns 4xx into a submission error (bad SQL, unknown database).
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    rejects_as_submission: bool,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LakeqError::remote(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        let message = format!("Query engine error ({}): {}", status, body);
        return Err(if rejects_as_submission && is_rejection(status) {
            LakeqError::submission(message)
        } else {
            LakeqError::remote(message)
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| LakeqError::remote(format!("Failed to parse response: {}", e)))
}

fn is_rejection(status: StatusCode) -> bool {
    status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl QueryEngine for HttpQueryEngine {
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle> {
        let body = SubmitRequest {
            database: &request.database_name,
            sql: &request.sql,
            results_location: &request.results_location,
        };

        debug!(database = %request.database_name, "Submitting query");
        let response = self
            .client
            .post(self.queries_url()?)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let submitted: SubmitResponse = decode(response, true).await?;
        Ok(ExecutionHandle::new(submitted.query_execution_id))
    }

    async fn wait(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata> {
        let mut delay = self.config.poll_initial;
        loop {
            let metadata = self.get_status(handle).await?;
            // Unknown states are returned as-is; the status mapper rejects them.
            match metadata.remote_state() {
                Some(state) if !state.is_terminal() => {}
                _ => return Ok(metadata),
            }

            debug!(query_id = %handle, state = %metadata.state, ?delay, "Query not finished");
            tokio::time::sleep(delay).await;
            delay = self.next_delay(delay);
        }
    }

    async fn get_status(&self, handle: &ExecutionHandle) -> Result<ExecutionMetadata> {
        let response = self
            .client
            .get(self.query_url(handle.as_str())?)
            .send()
            .await
            .map_err(send_error)?;

        decode(response, false).await
    }

    async fn get_result_page(
        &self,
        metadata: &ExecutionMetadata,
        token: Option<&ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<RawPage> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(token) = token {
            query.push(("nextToken", token.as_str().to_string()));
        }
        if let Some(max) = max_results {
            query.push(("maxResults", max.to_string()));
        }

        debug!(query_id = %metadata.query_id, has_token = token.is_some(), ?max_results, "Fetching result page");
        let response = self
            .client
            .get(self.results_url(&metadata.query_id)?)
            .query(&query)
            .send()
            .await
            .map_err(send_error)?;

        let page: ResultsResponse = decode(response, false).await?;
        Ok(page.into())
    }
}

// Engine API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    database: &'a str,
    sql: &'a str,
    results_location: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    query_execution_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultsResponse {
    #[serde(default)]
    rows: Vec<WireRow>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(default)]
    data: Vec<WireDatum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDatum {
    var_char_value: Option<String>,
}

impl From<ResultsResponse> for RawPage {
    fn from(response: ResultsResponse) -> Self {
        Self {
            rows: response
                .rows
                .into_iter()
                .map(|row| RawRow {
                    data: row.data.into_iter().map(|d| d.var_char_value).collect(),
                })
                .collect(),
            next_token: response.next_token,
        }
    }
}
