//! Per-file processing: concurrent row geocoding under a request ceiling.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use crate::census::Geocoder;
use crate::models::{AddressRecord, FileSummary, Outcome};
use crate::table::{self, FileError, Table};

/// Process one input table: geocode every non-blank address concurrently,
/// then persist the matched rows.
///
/// Row tasks share a fresh request gate sized to `max_concurrent_requests`;
/// each task holds a permit only for the duration of its lookup. Outcomes
/// are merged back by row index once every task has settled, so the output
/// preserves input order and a partially-geocoded table is never written.
pub async fn process_file(
    geocoder: Arc<dyn Geocoder>,
    input: &Path,
    output_dir: &Path,
    address_column: &str,
    max_concurrent_requests: usize,
) -> Result<FileSummary> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("table")
        .to_string();

    let table = Table::read(input)?;
    let column = table
        .column_index(address_column)
        .ok_or_else(|| FileError::MissingColumn {
            column: address_column.to_string(),
            path: input.to_path_buf(),
        })?;
    let total = table.len();
    info!("Processing {} ({} rows)", name, total);

    // Blank rows settle immediately without consuming a permit; the rest
    // go to gated tasks.
    let mut outcomes = vec![Outcome::Empty; total];
    let mut pending = Vec::new();
    for (row, record) in table.rows().iter().enumerate() {
        let address = record.get(column).unwrap_or("").trim();
        if address.is_empty() {
            info!(
                "{}: row {}/{} {}",
                name,
                row + 1,
                total,
                Outcome::Empty.marker()
            );
            continue;
        }
        pending.push(AddressRecord {
            row,
            address: address.to_string(),
        });
    }

    let gate = Arc::new(Semaphore::new(max_concurrent_requests));
    let mut tasks: JoinSet<(usize, Outcome)> = JoinSet::new();
    for record in pending {
        let gate = Arc::clone(&gate);
        let geocoder = Arc::clone(&geocoder);
        tasks.spawn(async move {
            let _permit = gate.acquire_owned().await.expect("request gate closed");
            let outcome = geocoder.resolve(&record.address).await;
            (record.row, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (row, outcome) = joined.context("geocode task panicked")?;
        info!("{}: row {}/{} {}", name, row + 1, total, outcome.marker());
        outcomes[row] = outcome;
    }

    let output = table::output_path(input, output_dir);
    let written = table::write_geocoded(&output, &table, &outcomes)?;
    info!("Completed {} ({} of {} rows geocoded)", name, written, total);

    Ok(FileSummary::new(input.to_path_buf(), output, &outcomes))
}
