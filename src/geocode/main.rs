//! Batch geocoding pipeline.
//!
//! Reads provider address tables from an input directory, resolves each
//! address through the Census geocoder under two concurrency ceilings,
//! and writes one geocoded table per input.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use pinpoint::batch::{self, BatchOptions};
use pinpoint::census::CensusClient;

#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(about = "Geocode address tables through the Census geocoder")]
struct Args {
    /// Directory containing input CSV tables
    #[arg(short, long, default_value = "copied")]
    input_dir: PathBuf,

    /// Directory where geocoded tables are written
    #[arg(short, long, default_value = "geocoded")]
    output_dir: PathBuf,

    /// Header name of the address column
    #[arg(long, default_value = "Address")]
    address_column: String,

    /// Maximum files processed concurrently
    #[arg(long, default_value = "5")]
    max_files: usize,

    /// Maximum geocode requests in flight per file
    #[arg(long, default_value = "10")]
    max_requests: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Pinpoint Batch Geocoder");
    info!("Input directory: {}", args.input_dir.display());

    let geocoder = Arc::new(CensusClient::new());
    let options = BatchOptions {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        address_column: args.address_column,
        max_concurrent_files: args.max_files,
        max_concurrent_requests: args.max_requests,
    };

    let report = batch::run(geocoder, &options).await?;

    for failed in &report.failed {
        error!("{}: {}", failed.path.display(), failed.reason);
    }
    info!(
        "All done! {} of {} files completed. Check results in: {}",
        report.completed,
        report.discovered,
        options.output_dir.display()
    );

    Ok(())
}
