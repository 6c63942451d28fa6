//! Batch coordination: file discovery, gated file tasks, final report.

mod file;
#[cfg(test)]
pub(crate) mod testing;

pub use file::process_file;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::census::Geocoder;
use crate::models::{BatchReport, FailedFile, FileSummary};

const INPUT_EXTENSION: &str = "csv";

/// Parameters for one batch run. Immutable for the run's duration.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Header name of the column holding the one-line address.
    pub address_column: String,
    /// Ceiling on files processed simultaneously.
    pub max_concurrent_files: usize,
    /// Ceiling on geocode requests in flight within one file.
    pub max_concurrent_requests: usize,
}

/// Find eligible input tables, sorted by name so scheduling order and the
/// report are deterministic.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!("Input directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == INPUT_EXTENSION) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Run the whole batch: one file task per discovered input, each gated by
/// a shared file-concurrency semaphore.
///
/// Per-file failures are logged and recorded in the report; they never
/// abort sibling files. Returns only after every file task has settled.
pub async fn run(geocoder: Arc<dyn Geocoder>, options: &BatchOptions) -> Result<BatchReport> {
    ensure!(
        options.max_concurrent_files >= 1,
        "files-in-flight ceiling must be at least 1"
    );
    ensure!(
        options.max_concurrent_requests >= 1,
        "requests-in-flight ceiling must be at least 1"
    );

    let inputs = discover_inputs(&options.input_dir)?;
    if inputs.is_empty() {
        info!(
            "No input tables found in {}",
            options.input_dir.display()
        );
        return Ok(BatchReport::default());
    }
    info!("Found {} input tables to process", inputs.len());

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let gate = Arc::new(Semaphore::new(options.max_concurrent_files));
    let mut tasks: JoinSet<(PathBuf, Result<FileSummary>)> = JoinSet::new();
    for input in &inputs {
        let gate = Arc::clone(&gate);
        let geocoder = Arc::clone(&geocoder);
        let input = input.clone();
        let output_dir = options.output_dir.clone();
        let address_column = options.address_column.clone();
        let max_requests = options.max_concurrent_requests;
        tasks.spawn(async move {
            let _permit = gate.acquire_owned().await.expect("file gate closed");
            let result =
                process_file(geocoder, &input, &output_dir, &address_column, max_requests).await;
            (input, result)
        });
    }

    let mut report = BatchReport {
        discovered: inputs.len(),
        ..Default::default()
    };
    while let Some(joined) = tasks.join_next().await {
        let (input, result) = joined.context("file task panicked")?;
        match result {
            Ok(_) => report.completed += 1,
            Err(e) => {
                error!("Failed to process {}: {:#}", input.display(), e);
                report.failed.push(FailedFile {
                    path: input,
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    info!(
        "Batch complete: {} of {} files processed",
        report.completed, report.discovered
    );
    Ok(report)
}
