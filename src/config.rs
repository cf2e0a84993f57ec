//! Configuration management for lakeq.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the remote query engine, result storage and the workflow engine.

use crate::error::{LakeqError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

/// Default state machine driving async queries.
pub const DEFAULT_STATE_MACHINE_NAME: &str = "lakeq-query-workflow";

/// Main configuration structure for lakeq.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage path the engine writes query results to.
    #[serde(default = "default_results_location")]
    pub results_location: String,

    /// Remote query engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Workflow engine settings.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

fn default_results_location() -> String {
    "s3://lakeq-query-results/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_location: default_results_location(),
            engine: EngineConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

/// Remote query engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine API.
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long ExecuteAsync sleeps before its single status check.
    #[serde(default = "default_minimal_query_wait_ms")]
    pub minimal_query_wait_ms: u64,

    /// First delay of the blocking-wait poll loop.
    #[serde(default = "default_wait_poll_initial_ms")]
    pub wait_poll_initial_ms: u64,

    /// Upper bound on the blocking-wait poll delay.
    #[serde(default = "default_wait_poll_max_ms")]
    pub wait_poll_max_ms: u64,
}

fn default_engine_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_minimal_query_wait_ms() -> u64 {
    4000
}

fn default_wait_poll_initial_ms() -> u64 {
    250
}

fn default_wait_poll_max_ms() -> u64 {
    5000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            timeout_secs: default_timeout_secs(),
            minimal_query_wait_ms: default_minimal_query_wait_ms(),
            wait_poll_initial_ms: default_wait_poll_initial_ms(),
            wait_poll_max_ms: default_wait_poll_max_ms(),
        }
    }
}

impl EngineConfig {
    /// Returns the ExecuteAsync short wait as a Duration.
    pub fn minimal_query_wait(&self) -> Duration {
        Duration::from_millis(self.minimal_query_wait_ms)
    }
}

/// Workflow engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Base URL of the workflow engine API.
    #[serde(default = "default_workflow_url")]
    pub url: String,

    /// Name of the state machine that drives async queries.
    #[serde(default = "default_state_machine_name")]
    pub state_machine_name: String,

    /// Region; falls back to AWS_REGION / AWS_DEFAULT_REGION at call time.
    pub region: Option<String>,

    /// Account id; falls back to AWS_ACCOUNT_ID at call time.
    pub account_id: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_workflow_url() -> String {
    "http://localhost:8091".to_string()
}

fn default_state_machine_name() -> String {
    DEFAULT_STATE_MACHINE_NAME.to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            url: default_workflow_url(),
            state_machine_name: default_state_machine_name(),
            region: None,
            account_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        // ~/.config/lakeq/config.toml on Linux
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lakeq")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // A missing file is not an error; every field has a default
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| LakeqError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            LakeqError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies LAKEQ_* environment variables over file values.
    pub fn apply_env_overrides(&mut self) {
        // Env wins over the file, but only when set
        if let Ok(url) = std::env::var("LAKEQ_ENGINE_URL") {
            self.engine.url = url;
        }
        if let Ok(url) = std::env::var("LAKEQ_WORKFLOW_URL") {
            self.workflow.url = url;
        }
        if let Ok(location) = std::env::var("LAKEQ_RESULTS_LOCATION") {
            self.results_location = location;
        }
    }

    /// Checks that both endpoint URLs parse and the wait settings are sane.
    pub fn validate(&self) -> Result<()> {
        // Both endpoints must be absolute http(s) URLs
        for (name, value) in [("engine.url", &self.engine.url), ("workflow.url", &self.workflow.url)]
        {
            let url = Url::parse(value)
                .map_err(|e| LakeqError::config(format!("Invalid {name} '{value}': {e}")))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(LakeqError::config(format!(
                    "Invalid scheme '{}' for {name}. Expected 'http' or 'https'",
                    url.scheme()
                )));
            }
        }

        // A zero initial delay would never back off
        if self.engine.wait_poll_initial_ms == 0 {
            return Err(LakeqError::config("engine.wait_poll_initial_ms must be positive"));
        }
        if self.engine.wait_poll_max_ms < self.engine.wait_poll_initial_ms {
            return Err(LakeqError::config(
                "engine.wait_poll_max_ms must not be below engine.wait_poll_initial_ms",
            ));
        }
        if self.results_location.is_empty() {
            return Err(LakeqError::config("results_location must not be empty"));
        }

        Ok(())
    }
}
