//! Flight Fare Data Processing Library
//!
//! Loading, cleaning and splitting of raw flight fare records, built on Polars.
//!
//! # Overview
//!
//! This library is the first stage of the fare prediction workflow:
//!
//! - **Loading**: Reads the raw CSV export and converts `duration` from
//!   fractional hours to whole minutes
//! - **Cleaning**: Drops exact duplicate rows, keeping first occurrences
//! - **Snapshots**: Persists the cleaned table as Parquet for the training stage
//! - **Records**: Typed [`FlightRecord`] access shared by training and serving
//! - **Splitting**: Seeded train/test split
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fare_processing::{DataLoader, ProjectPaths, save_snapshot};
//!
//! let paths = ProjectPaths::from_current_dir()?;
//! let (mut df, summary) = DataLoader::load(&paths.raw_data())?;
//! println!("Removed {} duplicates", summary.duplicates_removed);
//!
//! save_snapshot(&mut df, &paths.snapshot())?;
//! ```
//!
//! # Artifact Layout
//!
//! Every stage resolves its inputs and outputs through [`ProjectPaths`], so the
//! loader, the trainer and the prediction form agree on where files live.

pub mod config;
pub mod error;
pub mod loader;
pub mod paths;
pub mod persist;
pub mod records;
pub mod schema;
pub mod split;

// Re-exports for convenient access
pub use config::{ConfigValidationError, SplitConfig, SplitConfigBuilder};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use loader::{
    DataLoader, LoadSummary, convert_duration, hours_to_minutes, load_raw_data, load_snapshot,
    read_csv, remove_duplicates, save_snapshot,
};
pub use paths::{ProjectPaths, model_file_stem};
pub use persist::write_with_cleanup;
pub use records::{frame_from_records, records_from_frame, targets_from_frame};
pub use schema::{
    CATEGORICAL_FEATURES, COLUMN_ROLES, ColumnRole, FeatureValue, FlightRecord, NUMERIC_FEATURES,
    column_role,
};
pub use split::train_test_split;
