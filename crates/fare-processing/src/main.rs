//! CLI entry point for the loading and cleaning stage.

use anyhow::{Context, Result};
use clap::Parser;
use fare_processing::{DataLoader, ProjectPaths, save_snapshot};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Load and clean the raw flight fare export",
    long_about = "Reads data/raw/flight_prices.csv, converts durations to minutes, \
                  removes duplicate rows and writes data/processed/processed_data.parquet.\n\n\
                  EXAMPLES:\n  \
                  # Run from the project root\n  \
                  fare-processing\n\n  \
                  # Use another project root\n  \
                  fare-processing --root /srv/fares"
)]
struct Args {
    /// Project root containing data/ and models/
    ///
    /// Defaults to the current directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let paths = match args.root {
        Some(root) => ProjectPaths::new(root),
        None => ProjectPaths::from_current_dir().context("Cannot resolve current directory")?,
    };

    let raw = paths.raw_data();
    info!("Loading raw data from: {}", raw.display());
    let (mut df, summary) = DataLoader::load(&raw)?;

    let snapshot = paths.snapshot();
    save_snapshot(&mut df, &snapshot)?;

    println!(
        "Processed {} rows ({} duplicates removed, {} kept) -> {}",
        summary.rows_read,
        summary.duplicates_removed,
        summary.rows_kept,
        snapshot.display()
    );
    Ok(())
}
