//! CLI entry point for the interactive prediction form.

use airfare_predictor_lib::run;
use anyhow::{Context, Result};
use clap::Parser;
use fare_processing::ProjectPaths;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Predict a flight fare with the trained model",
    long_about = "Interactive prediction form.\n\n\
                  Requires models/best_model.bin and models/preprocessor.bin,\n\
                  written by `fare-learning train`.\n\n\
                  EXAMPLES:\n  \
                  # Use artifacts under the current directory\n  \
                  airfare-predictor\n\n  \
                  # Use another project root\n  \
                  airfare-predictor --root /data/fares"
)]
struct Args {
    /// Project root containing models/
    ///
    /// Defaults to the current directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "error" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let paths = match args.root {
        Some(root) => ProjectPaths::new(root),
        None => ProjectPaths::from_current_dir().context("Cannot resolve current directory")?,
    };

    run(&paths)?;
    Ok(())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
