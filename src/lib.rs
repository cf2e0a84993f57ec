//! lakeq - asynchronous SQL query execution over a remote data-lake engine.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod query;
pub mod workflow;
