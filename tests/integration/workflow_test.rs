//! Workflow hand-off integration tests.
//!
//! Tests the notify operation and a simulated workflow engine re-invoking the
//! step handlers with the state it was handed back.

use std::sync::Arc;
use std::time::Duration;

use lakeq::api::{DatabaseApi, ExecuteAsyncQueryNotifyInput, GetQueryResultsInput};
use lakeq::engine::MockQueryEngine;
use lakeq::query::ExecutionStatus;
use lakeq::workflow::mock::{RecordingWorkflowEngine, StaticIdentity};
use lakeq::workflow::{CallerIdentity, WorkflowNotifier, WorkflowState};

fn notify_input(sql: &str) -> ExecuteAsyncQueryNotifyInput {
    ExecuteAsyncQueryNotifyInput {
        database_name: "mydb".to_string(),
        sql: sql.to_string(),
        results_max_page_size: Some(100),
    }
}

/// Scenario: notify, then the workflow engine drives the query to completion
/// Given a query that needs several polls
/// When each step is re-invoked with the state returned by the previous one
/// Then the final state is terminal and the results can be paged out
#[tokio::test]
async fn test_notify_then_drive_steps() {
    let workflow = Arc::new(RecordingWorkflowEngine::new());
    let notifier = WorkflowNotifier::new(
        workflow.clone(),
        Arc::new(StaticIdentity::new(CallerIdentity::new("123456789012", "us-east-1"))),
        "lakeq-query-workflow",
    );
    let engine = MockQueryEngine::new()
        .with_states(["QUEUED", "RUNNING", "RUNNING", "SUCCEEDED"])
        .with_numbered_rows(150);
    let api = DatabaseApi::new(Arc::new(engine), notifier, "s3://results/")
        .with_minimal_wait(Duration::ZERO);

    let output = api
        .execute_async_query_notify(notify_input("SELECT n"))
        .await
        .unwrap();
    let runs = workflow.runs();
    assert_eq!(runs.len(), 1);
    assert!(output.workflow_id.as_str().ends_with(&runs[0].run_name));

    // The workflow engine hands the serialized input back on every invocation.
    let steps = api.steps();
    let mut input = runs[0].input.clone();
    let mut invocations = 0;
    let state = loop {
        let state: WorkflowState = serde_json::from_str(&input).unwrap();
        let next = steps.advance(state).await.unwrap();
        invocations += 1;
        if next.done {
            break next;
        }
        input = serde_json::to_string(&next).unwrap();
        assert!(invocations < 20, "workflow never finished");
    };

    assert_eq!(invocations, 4);
    assert_eq!(state.status, Some(ExecutionStatus::Succeeded));
    assert_eq!(state.results_max_page_size, Some(100));

    let first = api
        .get_query_results(GetQueryResultsInput {
            query_id: state.query_id.clone().expect("query id"),
            pagination_token: None,
            results_max_page_size: state.results_max_page_size,
        })
        .await
        .unwrap();
    assert_eq!(first.num_rows, 100);
    assert!(first.pagination_token.is_some());
}

/// Scenario: identity cannot be resolved
/// Then notify is a hard error and no run is started
#[tokio::test]
async fn test_notify_without_identity_is_hard_error() {
    let workflow = Arc::new(RecordingWorkflowEngine::new());
    let notifier = WorkflowNotifier::new(
        workflow.clone(),
        Arc::new(StaticIdentity::missing()),
        "lakeq-query-workflow",
    );
    let api = DatabaseApi::new(Arc::new(MockQueryEngine::new()), notifier, "s3://results/");

    let err = api
        .execute_async_query_notify(notify_input("SELECT 1"))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Identity Error");
    assert!(workflow.runs().is_empty());
}

/// Scenario: the workflow engine rejects the run
/// Then notify is a hard error
#[tokio::test]
async fn test_notify_rejected_run_is_hard_error() {
    let notifier = WorkflowNotifier::new(
        Arc::new(RecordingWorkflowEngine::failing()),
        Arc::new(StaticIdentity::new(CallerIdentity::new("123456789012", "us-east-1"))),
        "lakeq-query-workflow",
    );
    let api = DatabaseApi::new(Arc::new(MockQueryEngine::new()), notifier, "s3://results/");

    let result = api.execute_async_query_notify(notify_input("SELECT 1")).await;
    tokio_test::assert_err!(result);
}
