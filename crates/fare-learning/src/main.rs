//! CLI entry point for the preprocessor builder and the trainer.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fare_learning::{Preprocessor, Trainer, TrainerConfig};
use fare_processing::{ProjectPaths, SplitConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Build the feature preprocessor and train fare regressors",
    long_about = "Stage 2 and 3 of the fare prediction workflow.\n\n\
                  EXAMPLES:\n  \
                  # Declare the preprocessor (models/preprocessor.bin)\n  \
                  fare-learning preprocessor\n\n  \
                  # Train, evaluate and persist all models\n  \
                  fare-learning train\n\n  \
                  # Use another split\n  \
                  fare-learning train --test-size 0.25 --seed 7"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Project root containing data/ and models/
    ///
    /// Defaults to the current directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Declare the unfitted preprocessor and save it
    Preprocessor,

    /// Train every model on the processed snapshot and keep the best one
    Train {
        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the split and the tree ensembles
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of trees and boosting rounds
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Limit forest tree depth (unlimited when omitted)
        #[arg(long)]
        forest_max_depth: Option<usize>,
    },
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
    let cli = Cli::parse();
    init_logging(&cli.common.log_level, cli.common.quiet);

    let paths = match cli.common.root {
        Some(root) => ProjectPaths::new(root),
        None => ProjectPaths::from_current_dir().context("Cannot resolve current directory")?,
    };

    match cli.command {
        Command::Preprocessor => {
            let path = paths.preprocessor();
            Preprocessor::flight_default().save(&path)?;
            println!("Preprocessor saved to {}", path.display());
        }
        Command::Train {
            test_size,
            seed,
            n_estimators,
            forest_max_depth,
        } => {
            let split = SplitConfig::builder()
                .test_size(test_size)
                .random_seed(seed)
                .build()?;
            let config = TrainerConfig::builder()
                .random_seed(seed)
                .n_estimators(n_estimators)
                .forest_max_depth(forest_max_depth)
                .build()?;

            info!("Loading snapshot from: {}", paths.snapshot().display());
            let outcome = Trainer::new(config, split).run(&paths)?;

            println!("{}", outcome.metrics.to_frame()?);
            match outcome.metrics.get(&outcome.best_model) {
                Some(best) => println!("Best model: {} (R2 = {:.4})", best.model, best.r2),
                None => println!("Best model: {}", outcome.best_model),
            }
        }
    }
    Ok(())
}
