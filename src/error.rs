//! Error types for lakeq.
//!
//! Defines the main error enum used throughout the service.

use thiserror::Error;

/// Main error type for lakeq operations.
#[derive(Error, Debug)]
pub enum LakeqError {
    /// The remote engine rejected the submission (bad SQL, unknown database, etc.)
    #[error("Submission error: {0}")]
    Submission(String),

    /// Network or service faults while talking to the remote engine or workflow engine.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The account or region needed to address the workflow engine could not be resolved.
    #[error("Identity error: {0}")]
    Identity(String),

    /// Configuration errors (invalid config file, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote engine reported a state outside the known vocabulary.
    #[error("Unknown execution state: {raw}")]
    UnknownState {
        /// The state value exactly as the engine reported it.
        raw: String,
    },

    /// A blocking wait observed a terminal state other than success.
    #[error("Query {query_id} finished in state {state}")]
    QueryFailed { query_id: String, state: String },

    /// Results were requested from an execution that has not succeeded.
    #[error("Query {query_id} has no results yet (status {status})")]
    ResultsUnavailable { query_id: String, status: String },

    /// Request or response payloads could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LakeqError {
    /// Creates a submission error with the given message.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Creates a remote communication error with the given message.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates an identity error with the given message.
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an unknown-state error carrying the raw engine value.
    pub fn unknown_state(raw: impl Into<String>) -> Self {
        Self::UnknownState { raw: raw.into() }
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for the protocol-defect class (engine state outside the vocabulary).
    pub fn is_unknown_state(&self) -> bool {
        matches!(self, Self::UnknownState { .. })
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Submission(_) => "Submission Error",
            Self::Remote(_) => "Remote Error",
            Self::Identity(_) => "Identity Error",
            Self::Config(_) => "Configuration Error",
            Self::UnknownState { .. } => "Protocol Error",
            Self::QueryFailed { .. } => "Query Failed",
            Self::ResultsUnavailable { .. } => "Results Unavailable",
            Self::Serialization(_) => "Serialization Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<serde_json::Error> for LakeqError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias using LakeqError.
pub type Result<T> = std::result::Result<T, LakeqError>;
