//! Integration tests for lakeq.

pub mod http_engine_test;
pub mod lifecycle_test;
pub mod pagination_test;
pub mod workflow_test;
