//! Model training, evaluation and selection.
//!
//! The trainer reads the cleaned snapshot, splits it, fits the preprocessor on
//! the training records only, fits every [`ModelKind`] on the transformed
//! matrix and scores each model on the held-out split. The model with the
//! highest R² becomes the best model.
//!
//! # Outputs
//!
//! | File                              | Content                              |
//! |-----------------------------------|--------------------------------------|
//! | `models/<name>.bin`               | One [`NamedModel`] per kind          |
//! | `models/best_model.bin`           | Copy of the winning [`NamedModel`]   |
//! | `models/preprocessor.bin`         | The preprocessor, now fitted         |
//! | `models/model_performance.csv`    | `Model,MSE,R2` per model             |
//! | `models/training_report.json`     | [`TrainingReport`]                   |

use crate::config::TrainerConfig;
use crate::error::{LearningError, Result};
use crate::metrics::{MetricsTable, ModelMetrics, mean_squared_error, r2_score};
use crate::models::{ModelKind, NamedModel, Regressor, TrainedModel};
use crate::preprocessor::Preprocessor;
use chrono::{DateTime, Utc};
use fare_processing::{
    FlightRecord, ProjectPaths, SplitConfig, load_snapshot, records_from_frame,
    targets_from_frame, train_test_split, write_with_cleanup,
};
use ndarray::ArrayView1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn check_rows(records: &[FlightRecord], targets: &[f64], what: &str) -> Result<()> {
    if records.is_empty() {
        return Err(LearningError::InvalidData(format!("{} set is empty", what)));
    }
    if records.len() != targets.len() {
        return Err(LearningError::InvalidData(format!(
            "{} set has {} records but {} targets",
            what,
            records.len(),
            targets.len()
        )));
    }
    Ok(())
}

/// Fit `preprocessor` on the training records, then fit every model kind on
/// the transformed matrix, in [`ModelKind::ALL`] order.
pub fn train_models(
    train_x: &[FlightRecord],
    train_y: &[f64],
    preprocessor: &mut Preprocessor,
    config: &TrainerConfig,
) -> Result<Vec<NamedModel>> {
    check_rows(train_x, train_y, "training")?;
    config.validate()?;

    let x = preprocessor.fit_transform(train_x)?;
    let y = ArrayView1::from(train_y);

    let mut models = Vec::with_capacity(ModelKind::ALL.len());
    for kind in ModelKind::ALL {
        info!("Training {}...", kind);
        let mut model = TrainedModel::new(kind, config);
        model
            .fit(x.view(), y)
            .map_err(|e| LearningError::TrainingFailed(format!("{}: {}", kind, e)))?;
        models.push(NamedModel::new(model));
    }
    Ok(models)
}

/// Score every model on the held-out records. The preprocessor is only
/// applied, never refitted.
pub fn evaluate_models(
    models: &[NamedModel],
    preprocessor: &Preprocessor,
    test_x: &[FlightRecord],
    test_y: &[f64],
) -> Result<MetricsTable> {
    check_rows(test_x, test_y, "test")?;
    let x = preprocessor.transform(test_x)?;

    let mut table = MetricsTable::default();
    for named in models {
        let predictions = named.predict(x.view())?.to_vec();
        let row = ModelMetrics {
            model: named.name.clone(),
            mse: mean_squared_error(test_y, &predictions)?,
            r2: r2_score(test_y, &predictions)?,
        };
        info!("{}: MSE {:.2}, R2 {:.4}", row.model, row.mse, row.r2);
        table.push(row);
    }
    Ok(table)
}

/// The row with the highest R². Ties keep the earliest row; NaN never wins.
pub fn select_best(table: &MetricsTable) -> Result<&ModelMetrics> {
    let mut best: Option<&ModelMetrics> = None;
    for row in table.rows() {
        if row.r2.is_nan() {
            warn!("{} has an undefined R2 score", row.model);
            continue;
        }
        if best.is_none_or(|current| row.r2 > current.r2) {
            best = Some(row);
        }
    }
    best.ok_or_else(|| LearningError::TrainingFailed("no model has a valid R2 score".to_string()))
}

/// Write every model to `models/<name>.bin`.
pub fn save_models(models: &[NamedModel], paths: &ProjectPaths) -> Result<Vec<PathBuf>> {
    models
        .iter()
        .map(|named| {
            let path = paths.model(&named.name);
            named.save(&path)?;
            info!("Saved {} to {}", named.name, path.display());
            Ok(path)
        })
        .collect()
}

/// Write the model called `best_name` to `models/best_model.bin`.
pub fn save_best_model(
    models: &[NamedModel],
    best_name: &str,
    paths: &ProjectPaths,
) -> Result<PathBuf> {
    let best = models
        .iter()
        .find(|named| named.name == best_name)
        .ok_or_else(|| {
            LearningError::TrainingFailed(format!("best model '{}' was not trained", best_name))
        })?;

    let path = paths.best_model();
    best.save(&path)?;
    info!("Best model ({}) saved to {}", best_name, path.display());
    Ok(path)
}

/// Summary of one training run, written next to the models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub split: SplitConfig,
    pub config: TrainerConfig,
    pub models: Vec<ModelMetrics>,
    pub best_model: String,
}

impl TrainingReport {
    pub fn save(&self, path: &Path) -> Result<()> {
        write_with_cleanup::<LearningError, _>(path, |writer| {
            serde_json::to_writer_pretty(writer, self)?;
            Ok(())
        })?;
        info!("Training report saved: {}", path.display());
        Ok(())
    }
}

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub preprocessor: Preprocessor,
    pub models: Vec<NamedModel>,
    pub metrics: MetricsTable,
    pub best_model: String,
    pub report: TrainingReport,
}

/// Runs the training stage end to end.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
    split: SplitConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig, split: SplitConfig) -> Self {
        Self { config, split }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on `train`, score on `test`. Nothing is written to disk.
    pub fn train(
        &self,
        train: &DataFrame,
        test: &DataFrame,
        mut preprocessor: Preprocessor,
    ) -> Result<TrainingOutcome> {
        let train_x = records_from_frame(train)?;
        let train_y = targets_from_frame(train)?;
        let test_x = records_from_frame(test)?;
        let test_y = targets_from_frame(test)?;
        info!(
            "Training on {} rows, evaluating on {} rows",
            train_x.len(),
            test_x.len()
        );

        let models = train_models(&train_x, &train_y, &mut preprocessor, &self.config)?;
        let metrics = evaluate_models(&models, &preprocessor, &test_x, &test_y)?;
        let best_model = select_best(&metrics)?.model.clone();
        info!("Best model: {}", best_model);

        let report = TrainingReport {
            trained_at: Utc::now(),
            train_rows: train_x.len(),
            test_rows: test_x.len(),
            n_features: preprocessor.n_features_out()?,
            feature_names: preprocessor.feature_names()?,
            split: self.split,
            config: self.config.clone(),
            models: metrics.rows().to_vec(),
            best_model: best_model.clone(),
        };

        Ok(TrainingOutcome {
            preprocessor,
            models,
            metrics,
            best_model,
            report,
        })
    }

    /// Write every artifact of `outcome` under `paths`.
    pub fn persist(&self, outcome: &TrainingOutcome, paths: &ProjectPaths) -> Result<()> {
        outcome.preprocessor.save(&paths.preprocessor())?;
        save_models(&outcome.models, paths)?;
        save_best_model(&outcome.models, &outcome.best_model, paths)?;
        outcome.metrics.write_csv(&paths.metrics_table())?;
        outcome.report.save(&paths.training_report())?;
        Ok(())
    }

    /// Load the snapshot and the declared preprocessor, train, and persist.
    ///
    /// # Errors
    ///
    /// Fails with a not-found error when the loader stage or the preprocessor
    /// builder has not been run yet.
    pub fn run(&self, paths: &ProjectPaths) -> Result<TrainingOutcome> {
        let snapshot = load_snapshot(&paths.snapshot())?;
        let (train, test) = train_test_split(&snapshot, &self.split)?;
        let preprocessor = Preprocessor::load(&paths.preprocessor())?;

        let outcome = self.train(&train, &test, preprocessor)?;
        self.persist(&outcome, paths)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(rows: &[(&str, f64)]) -> MetricsTable {
        MetricsTable::new(
            rows.iter()
                .map(|(name, r2)| ModelMetrics {
                    model: name.to_string(),
                    mse: 1.0,
                    r2: *r2,
                })
                .collect(),
        )
    }

    #[test]
    fn test_select_best_by_r2() {
        let table = metrics(&[
            ("Linear Regression", 0.90),
            ("Random Forest", 0.98),
            ("Gradient Boosting", 0.95),
        ]);
        assert_eq!(select_best(&table).unwrap().model, "Random Forest");
    }

    #[test]
    fn test_select_best_tie_keeps_first() {
        let table = metrics(&[
            ("Linear Regression", 0.5),
            ("Random Forest", 0.9),
            ("Gradient Boosting", 0.9),
        ]);
        assert_eq!(select_best(&table).unwrap().model, "Random Forest");
    }

    #[test]
    fn test_select_best_ignores_nan() {
        let table = metrics(&[("Linear Regression", f64::NAN), ("Random Forest", -2.0)]);
        assert_eq!(select_best(&table).unwrap().model, "Random Forest");

        let all_nan = metrics(&[("Linear Regression", f64::NAN)]);
        let err = select_best(&all_nan).unwrap_err();
        assert_eq!(err.error_code(), "TRAINING_FAILED");
    }

    #[test]
    fn test_train_models_rejects_mismatched_rows() {
        let mut preprocessor = Preprocessor::flight_default();
        let record = FlightRecord {
            airline: "Indigo".to_string(),
            source_city: "Delhi".to_string(),
            departure_time: "Morning".to_string(),
            stops: "zero".to_string(),
            arrival_time: "Evening".to_string(),
            destination_city: "Mumbai".to_string(),
            class: "Economy".to_string(),
            duration: 150,
            days_left: 7,
        };

        let err = train_models(
            &[record],
            &[1.0, 2.0],
            &mut preprocessor,
            &TrainerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
        assert!(!preprocessor.is_fitted());
    }

    #[test]
    fn test_save_best_model_requires_trained_name() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        let err = save_best_model(&[], "Random Forest", &paths).unwrap_err();
        assert_eq!(err.error_code(), "TRAINING_FAILED");
        assert!(!paths.best_model().exists());
    }
}
