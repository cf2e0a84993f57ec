//! Query lifecycle integration tests.
//!
//! Tests the sync and async execution paths and the failure-forcing boundary.

use std::sync::Arc;
use std::time::Duration;

use lakeq::api::{
    DatabaseApi, ExecuteAsyncQueryInput, ExecuteQueryInput, GetQueryResultsInput,
    GetQueryStatusInput, EXECUTE_ASYNC_QUERY_FAILED, EXECUTE_QUERY_FAILED,
    GET_QUERY_RESULTS_FAILED, GET_QUERY_STATUS_FAILED,
};
use lakeq::engine::{FailurePoint, MockQueryEngine, RawRow};
use lakeq::query::{ExecutionStatus, QueryExecutor, QueryRequest};
use lakeq::workflow::mock::{RecordingWorkflowEngine, StaticIdentity};
use lakeq::workflow::{CallerIdentity, WorkflowNotifier};
use pretty_assertions::assert_eq;

fn api(engine: MockQueryEngine) -> DatabaseApi {
    let notifier = WorkflowNotifier::new(
        Arc::new(RecordingWorkflowEngine::new()),
        Arc::new(StaticIdentity::new(CallerIdentity::new(
            "123456789012",
            "us-east-1",
        ))),
        "lakeq-query-workflow",
    );
    DatabaseApi::new(Arc::new(engine), notifier, "s3://results/").with_minimal_wait(Duration::ZERO)
}

fn async_input(sql: &str, max: Option<usize>) -> ExecuteAsyncQueryInput {
    ExecuteAsyncQueryInput {
        database_name: "mydb".to_string(),
        sql: sql.to_string(),
        results_max_page_size: max,
    }
}

/// Scenario: SELECT 1 against mydb
/// Given an engine that finishes immediately with one row ["1"] and no cursor
/// When ExecuteQuery is called
/// Then the output is succeeded with that single row and no pagination token
#[tokio::test]
async fn test_execute_query_select_one() {
    let api = api(MockQueryEngine::new().with_rows(vec![RawRow::from_iter(["1"])]));

    let output = api
        .execute_query(ExecuteQueryInput {
            database_name: "mydb".to_string(),
            sql: "SELECT 1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output.status, ExecutionStatus::Succeeded);
    assert_eq!(output.num_rows, 1);
    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].values(), vec!["1"]);
    assert_eq!(output.pagination_token, None);
    assert_eq!(output.error_message, None);
}

/// Scenario: two identical sync executions
/// Then the engine sees two submissions with distinct handles
#[tokio::test]
async fn test_execute_sync_is_not_deduplicated() {
    let engine = Arc::new(MockQueryEngine::new());
    let executor = QueryExecutor::new(engine.clone());
    let request = QueryRequest::new("mydb", "SELECT 1", "s3://results/");

    let first = executor.execute_sync(request.clone()).await.unwrap();
    let second = executor.execute_sync(request).await.unwrap();

    assert_ne!(first.handle, second.handle);
    assert_eq!(engine.submissions().len(), 2);
}

/// Scenario: query finishes within the short wait
/// Then ExecuteAsyncQuery returns succeeded with rows inline
#[tokio::test]
async fn test_async_fast_query_returns_rows_inline() {
    let api = api(MockQueryEngine::new().with_numbered_rows(3));

    let output = api
        .execute_async_query(async_input("SELECT n", Some(10)))
        .await
        .unwrap();

    assert_eq!(output.status, ExecutionStatus::Succeeded);
    assert!(output.query_id.is_some());
    assert_eq!(output.num_rows, 3);
    assert_eq!(output.pagination_token, None);
}

/// Scenario: query still running after the short wait
/// Then ExecuteAsyncQuery returns running with no rows
/// And the query id works with GetQueryStatus and GetQueryResults
#[tokio::test]
async fn test_async_slow_query_is_resumable() {
    let api = api(MockQueryEngine::new()
        .with_states(["QUEUED", "RUNNING", "SUCCEEDED"])
        .with_numbered_rows(2));

    let output = api
        .execute_async_query(async_input("SELECT n", None))
        .await
        .unwrap();
    assert_eq!(output.status, ExecutionStatus::Running);
    assert!(output.rows.is_empty());
    let query_id = output.query_id.expect("query id");

    let status = api
        .get_query_status(GetQueryStatusInput {
            query_id: query_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(status.status, ExecutionStatus::Running);

    let results = api
        .get_query_results(GetQueryResultsInput {
            query_id,
            pagination_token: None,
            results_max_page_size: None,
        })
        .await
        .unwrap();
    assert_eq!(results.status, ExecutionStatus::Succeeded);
    assert_eq!(results.num_rows, 2);
}

/// Scenario: the engine fails at each primitive in turn
/// Then every business operation reports failed with its fixed message
#[tokio::test]
async fn test_failure_forcing_for_all_operations() {
    for point in [
        FailurePoint::Submit,
        FailurePoint::Wait,
        FailurePoint::Status,
        FailurePoint::Results,
    ] {
        // ExecuteQuery uses submit, wait and results.
        if point != FailurePoint::Status {
            let output = api(MockQueryEngine::new().failing_at(point))
                .execute_query(ExecuteQueryInput {
                    database_name: "mydb".to_string(),
                    sql: "SELECT 1".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(output.status, ExecutionStatus::Failed, "{point:?}");
            assert_eq!(output.error_message.as_deref(), Some(EXECUTE_QUERY_FAILED));
        }

        // ExecuteAsyncQuery uses submit, status and results.
        if point != FailurePoint::Wait {
            let output = api(MockQueryEngine::new().failing_at(point))
                .execute_async_query(async_input("SELECT 1", None))
                .await
                .unwrap();
            assert_eq!(output.status, ExecutionStatus::Failed, "{point:?}");
            assert_eq!(
                output.error_message.as_deref(),
                Some(EXECUTE_ASYNC_QUERY_FAILED)
            );
        }
    }

    let status_api = api(MockQueryEngine::new().failing_at(FailurePoint::Status));
    let handle = status_api
        .execute_async_query(async_input("SELECT 1", None))
        .await
        .unwrap()
        .query_id
        .expect("submission succeeded");

    let status = status_api
        .get_query_status(GetQueryStatusInput {
            query_id: handle.clone(),
        })
        .await
        .unwrap();
    assert_eq!(status.status, ExecutionStatus::Failed);
    assert_eq!(status.error_message.as_deref(), Some(GET_QUERY_STATUS_FAILED));

    let results = status_api
        .get_query_results(GetQueryResultsInput {
            query_id: handle,
            pagination_token: None,
            results_max_page_size: None,
        })
        .await
        .unwrap();
    assert_eq!(results.status, ExecutionStatus::Failed);
    assert_eq!(results.error_message.as_deref(), Some(GET_QUERY_RESULTS_FAILED));
}

/// Scenario: the engine reports a state outside its vocabulary
/// Then the operations return the unknown-state error instead of a failed status
#[tokio::test]
async fn test_unknown_state_surfaces_distinctly() {
    let api = api(MockQueryEngine::new().with_states(["QUEUED", "HIBERNATING"]));

    let output = api
        .execute_async_query(async_input("SELECT 1", None))
        .await
        .unwrap();
    let query_id = output.query_id.expect("query id");

    let err = api
        .get_query_status(GetQueryStatusInput { query_id })
        .await
        .unwrap_err();
    assert!(err.is_unknown_state());
    assert!(err.to_string().contains("HIBERNATING"));
}
