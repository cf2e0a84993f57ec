//! Conversion of raw engine pages into result pages.

use crate::engine::RawPage;
use crate::query::{Column, ContinuationToken, ResultPage, Row};

/// Converts a raw page into a `ResultPage` and decides the continuation token.
///
/// Rows and cells keep the order the engine returned them in; null cells become
/// empty strings. An empty page never continues. A non-empty page forwards the
/// engine's cursor whenever the engine supplied one, including short pages
/// under `max_page_size`, since dropping a live cursor would silently lose rows.
pub fn collect_page(raw: RawPage, max_page_size: Option<usize>) -> ResultPage {
    let rows: Vec<Row> = raw
        .rows
        .into_iter()
        .map(|row| Row {
            columns: row
                .data
                .into_iter()
                .map(|cell| Column::new(cell.unwrap_or_default()))
                .collect(),
        })
        .collect();

    let row_count = rows.len();
    let continuation_token = if row_count > 0 {
        if let (Some(max), Some(_)) = (max_page_size, raw.next_token.as_ref()) {
            if row_count < max {
                tracing::debug!(row_count, max, "Short page with engine cursor; continuing");
            }
        }
        raw.next_token.map(ContinuationToken::new)
    } else {
        None
    };

    ResultPage {
        rows,
        row_count,
        continuation_token,
    }
}
