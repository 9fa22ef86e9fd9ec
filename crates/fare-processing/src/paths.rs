//! Artifact locations.
//!
//! Every stage resolves its inputs and outputs from a single project root so
//! that the loader, the trainer and the prediction form agree on where
//! artifacts live.
//!
//! ```text
//! <root>/
//! ├── data/
//! │   ├── raw/flight_prices.csv
//! │   └── processed/processed_data.parquet
//! └── models/
//!     ├── preprocessor.bin
//!     ├── <model_name>.bin
//!     ├── best_model.bin
//!     ├── model_performance.csv
//!     └── training_report.json
//! ```

use std::path::{Path, PathBuf};

pub const RAW_DATA_FILE: &str = "flight_prices.csv";
pub const SNAPSHOT_FILE: &str = "processed_data.parquet";
pub const PREPROCESSOR_FILE: &str = "preprocessor.bin";
pub const BEST_MODEL_FILE: &str = "best_model.bin";
pub const METRICS_FILE: &str = "model_performance.csv";
pub const REPORT_FILE: &str = "training_report.json";
pub const MODEL_EXTENSION: &str = "bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use the current working directory as the project root.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_data(&self) -> PathBuf {
        self.root.join("data").join("raw").join(RAW_DATA_FILE)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn snapshot(&self) -> PathBuf {
        self.processed_dir().join(SNAPSHOT_FILE)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn preprocessor(&self) -> PathBuf {
        self.models_dir().join(PREPROCESSOR_FILE)
    }

    pub fn best_model(&self) -> PathBuf {
        self.models_dir().join(BEST_MODEL_FILE)
    }

    pub fn metrics_table(&self) -> PathBuf {
        self.models_dir().join(METRICS_FILE)
    }

    pub fn training_report(&self) -> PathBuf {
        self.models_dir().join(REPORT_FILE)
    }

    /// Path of the artifact for a model with the given display name.
    pub fn model(&self, name: &str) -> PathBuf {
        self.models_dir()
            .join(format!("{}.{}", model_file_stem(name), MODEL_EXTENSION))
    }
}

/// "Random Forest" -> "random_forest"
pub fn model_file_stem(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}
