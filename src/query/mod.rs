//! Query lifecycle for lakeq.
//!
//! This module isolates submission, status mapping, polling and paginated
//! result collection from the exposed operation surface.

pub mod collector;
pub mod executor;
pub mod pager;
pub mod poller;
pub mod status;
mod types;

pub use collector::collect_page;
pub use executor::{AsyncCheck, AsyncExecution, QueryExecutor, SyncExecution};
pub use pager::{FetchedPage, ResultPager};
pub use poller::StatusPoller;
pub use status::map_state;
pub use types::{
    page_bound, Column, ContinuationToken, ExecutionHandle, ExecutionStatus, QueryRequest,
    ResultPage, Row,
};
