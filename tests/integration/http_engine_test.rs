//! HTTP engine integration tests.
//!
//! These tests require a running engine API.
//! Set LAKEQ_TEST_ENGINE_URL (and optionally LAKEQ_TEST_DATABASE) to run them.

use lakeq::engine::{HttpEngineConfig, HttpQueryEngine, QueryEngine};
use lakeq::query::{ExecutionStatus, QueryExecutor, QueryRequest, ResultPager};
use std::sync::Arc;

/// Helper to create a test client.
fn get_test_engine() -> Option<Arc<HttpQueryEngine>> {
    let url = std::env::var("LAKEQ_TEST_ENGINE_URL").ok()?;
    HttpQueryEngine::new(HttpEngineConfig::new(url)).ok().map(Arc::new)
}

fn test_database() -> String {
    std::env::var("LAKEQ_TEST_DATABASE").unwrap_or_else(|_| "default".to_string())
}

fn results_location() -> String {
    std::env::var("LAKEQ_TEST_RESULTS_LOCATION")
        .unwrap_or_else(|_| "s3://lakeq-query-results/tests/".to_string())
}

#[tokio::test]
async fn test_select_one_round_trip() {
    let Some(engine) = get_test_engine() else {
        eprintln!("Skipping test: LAKEQ_TEST_ENGINE_URL not set");
        return;
    };

    let executor = QueryExecutor::new(engine);
    let outcome = executor
        .execute_sync(QueryRequest::new(test_database(), "SELECT 1", results_location()))
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Succeeded);
    assert!(outcome.page.row_count >= 1);
}

#[tokio::test]
async fn test_bounded_pages() {
    let Some(engine) = get_test_engine() else {
        eprintln!("Skipping test: LAKEQ_TEST_ENGINE_URL not set");
        return;
    };

    let sql = "SELECT * FROM UNNEST(SEQUENCE(1, 25)) AS t(n)";
    let handle = engine
        .submit(&QueryRequest::new(test_database(), sql, results_location()))
        .await
        .unwrap();
    engine.wait(&handle).await.unwrap();

    let pager = ResultPager::new(engine);
    let first = pager.fetch_page(&handle, None, Some(10)).await.unwrap();
    assert_eq!(first.status, ExecutionStatus::Succeeded);
    assert_eq!(first.page.row_count, 10);
    assert!(first.page.has_more());
}

#[tokio::test]
async fn test_invalid_sql_is_rejected() {
    let Some(engine) = get_test_engine() else {
        eprintln!("Skipping test: LAKEQ_TEST_ENGINE_URL not set");
        return;
    };

    let executor = QueryExecutor::new(engine);
    let result = executor
        .execute_sync(QueryRequest::new(test_database(), "SELEC nonsense", results_location()))
        .await;
    assert!(result.is_err());
}
