//! Errors surfaced by the prediction form.
//!
//! Startup errors ([`ModelNotFound`](PredictorError::ModelNotFound) and
//! [`ArtifactLoad`](PredictorError::ArtifactLoad)) are fatal. Prediction
//! errors are shown to the user and the session continues.

use fare_learning::LearningError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    /// A trained artifact is missing. The training stage has not run.
    #[error("Model file not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    /// An artifact exists but cannot be used.
    #[error("Error loading model: {0}")]
    ArtifactLoad(String),

    /// A submission could not be turned into a price.
    #[error("Error making prediction: {0}")]
    Prediction(String),

    /// Reading from the terminal failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl PredictorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::ArtifactLoad(_) => "ARTIFACT_LOAD_ERROR",
            Self::Prediction(_) => "PREDICTION_ERROR",
            Self::Prompt(_) => "PROMPT_ERROR",
        }
    }

    /// Whether the error ends the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Prediction(_))
    }

    /// Map an artifact loading failure. A missing file keeps its path.
    pub(crate) fn from_load(err: LearningError) -> Self {
        match err {
            LearningError::ArtifactNotFound { path } => Self::ModelNotFound { path },
            other => Self::ArtifactLoad(other.to_string()),
        }
    }
}

impl From<dialoguer::Error> for PredictorError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

impl From<std::io::Error> for PredictorError {
    fn from(err: std::io::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PredictorError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PredictorError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
