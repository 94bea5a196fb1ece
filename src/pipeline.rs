//! Search → fetch → extract pipeline.
//!
//! Records are fetched one at a time in ID order. A record that cannot be
//! fetched or parsed is logged and skipped; the rest of the batch carries on.

use crate::error::Result;
use crate::extractor::{OutputRow, RecordExtractor};
use crate::source::RecordSource;
use tracing::{info, warn};

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// IDs returned by the search, in order
    pub ids: Vec<String>,
    /// Extracted rows, in ID order
    pub rows: Vec<OutputRow>,
    /// IDs whose record could not be fetched or parsed
    pub failed: Vec<String>,
}

/// Extract rows for each ID, skipping failures.
pub async fn fetch_rows<S>(
    source: &S,
    extractor: &RecordExtractor,
    ids: &[String],
) -> (Vec<OutputRow>, Vec<String>)
where
    S: RecordSource + ?Sized,
{
    let mut rows = Vec::with_capacity(ids.len());
    let mut failed = Vec::new();

    for (idx, id) in ids.iter().enumerate() {
        let record = match source.fetch_record(id).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(pmid = %id, error = %e, "Failed to fetch record");
                None
            }
        };

        match extractor.extract(id, record.as_ref()) {
            Some(row) => rows.push(row),
            None => failed.push(id.clone()),
        }

        if (idx + 1) % 50 == 0 {
            info!(done = idx + 1, total = ids.len(), "Fetching records");
        }
    }

    (rows, failed)
}

/// Search `query` and extract up to `max_results` records.
///
/// Only the search itself can fail the run.
pub async fn run<S>(
    source: &S,
    extractor: &RecordExtractor,
    query: &str,
    max_results: usize,
) -> Result<PipelineReport>
where
    S: RecordSource + ?Sized,
{
    let ids = source.search_ids(query, max_results).await?;
    info!(count = ids.len(), "Fetched paper IDs");

    let (rows, failed) = fetch_rows(source, extractor, &ids).await;
    info!(
        extracted = rows.len(),
        failed = failed.len(),
        "Extraction complete"
    );

    Ok(PipelineReport { ids, rows, failed })
}
