//! Incremental result retrieval.
//!
//! Each call re-checks status and fetches at most one page, so pagination is
//! stateless given a handle and a continuation token. Callers must chain
//! tokens serially; stale or concurrent tokens are not fenced here.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::engine::QueryEngine;
use crate::error::{LakeqError, Result};
use crate::query::collector::collect_page;
use crate::query::status::map_metadata;
use crate::query::{page_bound, ContinuationToken, ExecutionHandle, ExecutionStatus, ResultPage};

/// Fetches result pages for a finished execution.
#[derive(Clone)]
pub struct ResultPager {
    engine: Arc<dyn QueryEngine>,
}

/// A page together with the status observed when fetching it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: ExecutionStatus,
    pub page: ResultPage,
}

impl ResultPager {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Fetches exactly one page.
    ///
    /// If the execution has not succeeded, returns the observed status with an
    /// empty page instead of reading a result set that may not exist. A zero
    /// `max_page_size` means no bound.
    pub async fn fetch_page(
        &self,
        handle: &ExecutionHandle,
        token: Option<&ContinuationToken>,
        max_page_size: Option<usize>,
    ) -> Result<FetchedPage> {
        let max_page_size = page_bound(max_page_size);
        let metadata = self.engine.get_status(handle).await?;
        let status = map_metadata(&metadata)?;
        if status != ExecutionStatus::Succeeded {
            debug!(query_id = %handle, %status, "Results requested before success");
            return Ok(FetchedPage {
                status,
                page: ResultPage::empty(),
            });
        }

        let raw = self
            .engine
            .get_result_page(&metadata, token, max_page_size)
            .await?;
        let page = collect_page(raw, max_page_size);
        debug!(
            query_id = %handle,
            rows = page.row_count,
            more = page.has_more(),
            "Fetched result page"
        );

        Ok(FetchedPage { status, page })
    }

    /// Streams every page from the start, following continuation tokens serially.
    ///
    /// Ends after the first page carrying no token, or after the first error.
    /// An execution that has not succeeded yields `ResultsUnavailable` rather
    /// than an empty page, so a drain never looks complete when it is not.
    pub fn pages(
        &self,
        handle: ExecutionHandle,
        max_page_size: Option<usize>,
    ) -> BoxStream<'_, Result<ResultPage>> {
        // None: drained. Some(token): next page to fetch.
        let start: Option<Option<ContinuationToken>> = Some(None);
        stream::try_unfold(start, move |cursor| {
            let handle = handle.clone();
            async move {
                let Some(token) = cursor else {
                    return Ok::<_, LakeqError>(None);
                };
                let fetched = self.fetch_page(&handle, token.as_ref(), max_page_size).await?;
                if fetched.status != ExecutionStatus::Succeeded {
                    return Err(LakeqError::ResultsUnavailable {
                        query_id: handle.into_inner(),
                        status: fetched.status.to_string(),
                    });
                }
                let next = fetched.page.continuation_token.clone().map(Some);
                Ok(Some((fetched.page, next)))
            }
        })
        .boxed()
    }
}
