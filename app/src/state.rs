//! Process-wide artifact cache.
//!
//! The best model and the fitted preprocessor are read from disk once, on the
//! first call to [`artifacts`], and shared read-only for the rest of the
//! process. A failed load leaves the cache empty and is reported to the
//! caller; nothing is refreshed once the cache is filled.

use crate::error::{PredictorError, Result};
use fare_learning::{NamedModel, Preprocessor};
use fare_processing::{FlightRecord, ProjectPaths};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::info;

static ARTIFACTS: OnceCell<LoadedArtifacts> = OnceCell::new();

/// The artifacts the form needs to price a flight.
#[derive(Debug)]
pub struct LoadedArtifacts {
    model: NamedModel,
    preprocessor: Preprocessor,
    model_path: PathBuf,
}

impl LoadedArtifacts {
    /// Load the best model and the fitted preprocessor under `paths`.
    ///
    /// # Errors
    ///
    /// [`PredictorError::ModelNotFound`] when either file is missing,
    /// [`PredictorError::ArtifactLoad`] when a file is unreadable, the
    /// preprocessor was never fitted, or its output width differs from the
    /// width the model was trained on.
    pub fn load(paths: &ProjectPaths) -> Result<Self> {
        let model_path = paths.best_model();
        let model = NamedModel::load(&model_path).map_err(PredictorError::from_load)?;

        let preprocessor =
            Preprocessor::load(&paths.preprocessor()).map_err(PredictorError::from_load)?;
        if !preprocessor.is_fitted() {
            return Err(PredictorError::ArtifactLoad(
                "preprocessor has not been fitted".to_string(),
            ));
        }

        let width = preprocessor
            .n_features_out()
            .map_err(PredictorError::from_load)?;
        if model.n_features() != Some(width) {
            return Err(PredictorError::ArtifactLoad(format!(
                "preprocessor produces {} features but {} expects {}",
                width,
                model.name,
                model
                    .n_features()
                    .map_or_else(|| "none".to_string(), |n| n.to_string())
            )));
        }

        info!("Loaded {} from {}", model.name, model_path.display());
        Ok(Self {
            model,
            preprocessor,
            model_path,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Price a single flight.
    pub fn predict(&self, record: &FlightRecord) -> Result<f64> {
        let features = self
            .preprocessor
            .transform(std::slice::from_ref(record))
            .map_err(|e| PredictorError::Prediction(e.to_string()))?;
        let predictions = self
            .model
            .predict(features.view())
            .map_err(|e| PredictorError::Prediction(e.to_string()))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| PredictorError::Prediction("model returned no value".to_string()))
    }
}

/// The shared artifacts, loading them on first use.
pub fn artifacts(paths: &ProjectPaths) -> Result<&'static LoadedArtifacts> {
    ARTIFACTS.get_or_try_init(|| LoadedArtifacts::load(paths))
}

static_assertions::assert_impl_all!(LoadedArtifacts: Send, Sync);
