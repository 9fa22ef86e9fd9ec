//! Regression metrics and the per-model metrics table.

use crate::error::{LearningError, Result};
use fare_processing::write_with_cleanup;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(LearningError::InvalidData(
            "cannot score an empty prediction set".to_string(),
        ));
    }
    if y_true.len() != y_pred.len() {
        return Err(LearningError::InvalidData(format!(
            "{} targets but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

/// Mean of squared residuals.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let sse: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sse / y_true.len() as f64)
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant target has `SS_tot = 0`; the score is then 1.0 for a perfect
/// prediction and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Held-out scores of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub model: String,
    pub mse: f64,
    pub r2: f64,
}

/// One row per evaluated model, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    rows: Vec<ModelMetrics>,
}

impl MetricsTable {
    pub fn new(rows: Vec<ModelMetrics>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ModelMetrics] {
        &self.rows
    }

    pub fn push(&mut self, row: ModelMetrics) {
        self.rows.push(row);
    }

    pub fn get(&self, model: &str) -> Option<&ModelMetrics> {
        self.rows.iter().find(|row| row.model == model)
    }

    /// The table as a `Model, MSE, R2` DataFrame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df![
            "Model" => self.rows.iter().map(|r| r.model.as_str()).collect::<Vec<_>>(),
            "MSE" => self.rows.iter().map(|r| r.mse).collect::<Vec<f64>>(),
            "R2" => self.rows.iter().map(|r| r.r2).collect::<Vec<f64>>(),
        ]?;
        Ok(df)
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut df = self.to_frame()?;
        write_with_cleanup::<LearningError, _>(path, |writer| {
            CsvWriter::new(writer).include_header(true).finish(&mut df)?;
            Ok(())
        })?;
        info!("Metrics table saved: {}", path.display());
        Ok(())
    }
}
