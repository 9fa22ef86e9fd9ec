//! Custom error types for the loading and cleaning stage.
//!
//! This module provides the error hierarchy used by every operation in the
//! crate. Errors are serializable so that a caller (for example the
//! prediction form) can render them as `{code, message}` pairs.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the loading and cleaning stage.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The raw data file does not exist.
    #[error("Data file not found at: {}", path.display())]
    DataFileNotFound { path: PathBuf },

    /// The cleaned snapshot does not exist (loader stage has not run).
    #[error("Processed snapshot not found at: {}", path.display())]
    SnapshotNotFound { path: PathBuf },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A value could not be interpreted (null, unparseable, out of range).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DataFileNotFound { .. } => "DATA_FILE_NOT_FOUND",
            Self::SnapshotNotFound { .. } => "SNAPSHOT_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means an input file is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DataFileNotFound { .. } | Self::SnapshotNotFound { .. } => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ProcessingError::DataFileNotFound {
            path: PathBuf::from("data/raw/flight_prices.csv"),
        };
        assert_eq!(err.error_code(), "DATA_FILE_NOT_FOUND");
        assert_eq!(
            ProcessingError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_not_found_message_names_path() {
        let err = ProcessingError::DataFileNotFound {
            path: PathBuf::from("data/raw/flight_prices.csv"),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("data/raw/flight_prices.csv"));
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("duration".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("duration"));
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = ProcessingError::SnapshotNotFound {
            path: PathBuf::from("x.parquet"),
        }
        .with_context("While training");
        assert!(error.to_string().contains("While training"));
        assert_eq!(error.error_code(), "SNAPSHOT_NOT_FOUND");
        assert!(error.is_not_found());
    }
}
