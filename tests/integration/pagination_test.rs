//! Paginated result retrieval integration tests.
//!
//! Tests token chaining, page-size bounds and drain completeness.

use std::sync::Arc;

use futures::TryStreamExt;
use lakeq::engine::{MockQueryEngine, QueryEngine};
use lakeq::error::LakeqError;
use lakeq::query::{ContinuationToken, ExecutionHandle, QueryRequest, ResultPage, ResultPager};
use pretty_assertions::assert_eq;

async fn finished_query(rows: usize) -> (ResultPager, ExecutionHandle) {
    let engine = Arc::new(MockQueryEngine::new().with_numbered_rows(rows));
    let handle = engine
        .submit(&QueryRequest::new("mydb", "SELECT n FROM numbers", "s3://results/"))
        .await
        .unwrap();
    engine.wait(&handle).await.unwrap();
    (ResultPager::new(engine), handle)
}

/// Follows tokens by hand until a page carries none, returning every value seen.
async fn chain(pager: &ResultPager, handle: &ExecutionHandle, max: Option<usize>) -> Vec<ResultPage> {
    let mut pages = Vec::new();
    let mut token: Option<ContinuationToken> = None;
    loop {
        let fetched = pager.fetch_page(handle, token.as_ref(), max).await.unwrap();
        token = fetched.page.continuation_token.clone();
        pages.push(fetched.page);
        if token.is_none() {
            return pages;
        }
        assert!(pages.len() < 1000, "pagination never terminated");
    }
}

fn values(pages: &[ResultPage]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.rows.iter().map(|r| r.columns[0].value.clone()))
        .collect()
}

/// Scenario: 250 rows fetched with maxPageSize = 100
/// Then pages hold 100, 100 and 50 rows, the last without a token
#[tokio::test]
async fn test_250_rows_by_100() {
    let (pager, handle) = finished_query(250).await;

    let pages = chain(&pager, &handle, Some(100)).await;

    let counts: Vec<usize> = pages.iter().map(|p| p.row_count).collect();
    assert_eq!(counts, vec![100, 100, 50]);
    assert!(pages[0].has_more());
    assert!(pages[1].has_more());
    assert!(!pages[2].has_more());
    assert_eq!(values(&pages).len(), 250);
}

/// Scenario: chaining tokens for several result sizes and bounds
/// Then the concatenation equals the full result set in order, with no gaps or duplicates
#[tokio::test]
async fn test_chain_reassembles_full_result() {
    for (rows, max) in [(0, Some(10)), (1, None), (10, Some(10)), (99, Some(7)), (1500, None)] {
        let (pager, handle) = finished_query(rows).await;
        let pages = chain(&pager, &handle, max).await;

        let expected: Vec<String> = (0..rows).map(|i| i.to_string()).collect();
        assert_eq!(values(&pages), expected, "rows={rows} max={max:?}");
    }
}

/// Scenario: maxPageSize = N with at least N rows remaining
/// Then the page has exactly N rows and a token
#[tokio::test]
async fn test_page_size_bound_respected() {
    let (pager, handle) = finished_query(30).await;

    let first = pager.fetch_page(&handle, None, Some(12)).await.unwrap();
    assert_eq!(first.page.row_count, 12);
    assert!(first.page.has_more());

    let second = pager
        .fetch_page(&handle, first.page.continuation_token.as_ref(), Some(12))
        .await
        .unwrap();
    assert_eq!(second.page.row_count, 12);
    assert_eq!(second.page.rows[0].values(), vec!["12"]);
}

/// Scenario: draining through the page stream
/// Then it yields the same rows as chaining by hand
#[tokio::test]
async fn test_stream_matches_manual_chain() {
    let (pager, handle) = finished_query(42).await;

    let streamed: Vec<ResultPage> = pager.pages(handle.clone(), Some(5)).try_collect().await.unwrap();
    let chained = chain(&pager, &handle, Some(5)).await;

    assert_eq!(values(&streamed), values(&chained));
    assert_eq!(streamed.len(), 9);
}

/// Scenario: draining a query that is still running
/// Then the stream fails instead of ending as an empty, complete result
#[tokio::test]
async fn test_stream_on_unfinished_query_is_not_complete() {
    let engine = Arc::new(
        MockQueryEngine::new()
            .with_states(["QUEUED", "RUNNING", "SUCCEEDED"])
            .with_numbered_rows(5),
    );
    let handle = engine
        .submit(&QueryRequest::new("mydb", "SELECT n FROM numbers", "s3://results/"))
        .await
        .unwrap();
    let pager = ResultPager::new(engine);

    let drained: Result<Vec<ResultPage>, LakeqError> = pager.pages(handle, None).try_collect().await;
    assert!(matches!(drained, Err(LakeqError::ResultsUnavailable { .. })));
}

/// Scenario: a zero page bound
/// Then it behaves like no bound and returns every row
#[tokio::test]
async fn test_zero_page_bound_returns_all_rows() {
    let (pager, handle) = finished_query(5).await;

    let pages = chain(&pager, &handle, Some(0)).await;

    assert_eq!(pages.len(), 1);
    assert_eq!(values(&pages), vec!["0", "1", "2", "3", "4"]);
}
