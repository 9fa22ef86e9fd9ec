//! Error types for the fare-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Example
//!
//! ```no_run
//! use fare_learning::{LearningError, TrainerConfig};
//!
//! fn configure() -> Result<TrainerConfig, LearningError> {
//!     // Errors are automatically propagated with ?
//!     let config = TrainerConfig::builder()
//!         .n_estimators(50)
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use fare_processing::ProcessingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fare-learning operations.
///
/// This enum covers all error conditions that can occur during:
/// - Trainer configuration and validation
/// - Preprocessor construction, fitting and transformation
/// - Model training and evaluation
/// - Artifact persistence and loading
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer or preprocessor.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or inference.
    ///
    /// Common causes:
    /// - Empty training set
    /// - Feature matrix and target vector have different lengths
    /// - Non-finite values in the target
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A transform or prediction was requested before fitting.
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    /// An artifact file does not exist (an earlier stage has not run).
    #[error("Artifact not found: {}", path.display())]
    ArtifactNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// An artifact could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Training failed for a specific model.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// An error occurred during prediction.
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Error raised by the loading stage (snapshot, records, split).
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Polars error while writing the metrics table.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON error while writing the training report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LearningError {
    /// Stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::InferenceError(_) => "INFERENCE_ERROR",
            Self::Processing(inner) => inner.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Check if this error means an input file is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ArtifactNotFound { .. } => true,
            Self::Processing(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
