//! Column-wise feature transform for flight records.
//!
//! A [`Preprocessor`] standardizes the numeric columns and one-hot encodes the
//! categorical columns, producing a dense feature matrix. It is declared once
//! (unfitted), fitted on the training records only, and then reused unchanged
//! for evaluation and serving.
//!
//! # Output layout
//!
//! ```text
//! [ numeric_0 .. numeric_k | <cat_0>_<value_0> .. | <cat_1>_<value_0> .. | ... ]
//! ```
//!
//! Numeric columns come first in declaration order, followed by one indicator
//! per learned category. Categories within a column are sorted, so the layout
//! only depends on the set of training values.
//!
//! # Example
//!
//! ```rust,ignore
//! use fare_learning::Preprocessor;
//!
//! let mut preprocessor = Preprocessor::flight_default();
//! let train_x = preprocessor.fit_transform(&train_records)?;
//! let test_x = preprocessor.transform(&test_records)?;
//! assert_eq!(train_x.ncols(), test_x.ncols());
//! ```

use crate::artifacts::{load_artifact, save_artifact};
use crate::error::{LearningError, Result};
use fare_processing::{
    CATEGORICAL_FEATURES, ColumnRole, FlightRecord, NUMERIC_FEATURES, column_role,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Mean and scale learned for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    fn fit(values: impl Iterator<Item = f64> + Clone) -> Self {
        let (sum, count) = values.clone().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        let mean = sum / count as f64;
        let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std = variance.sqrt();

        // Constant columns pass through centered but unscaled.
        let scale = if std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            1.0
        };
        Self { mean, scale }
    }

    #[inline]
    fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Sorted vocabulary learned for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    fn fit<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let categories: BTreeSet<&str> = values.collect();
        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    /// Position of `value` in the vocabulary, `None` for unseen categories.
    #[inline]
    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedState {
    scalers: Vec<StandardScaler>,
    encoders: Vec<OneHotEncoder>,
}

/// Standardize-and-one-hot feature transform.
///
/// Constructed unfitted; [`fit`](Self::fit) learns the per-column statistics.
/// Unseen categories at transform time produce an all-zero indicator group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric: Vec<String>,
    categorical: Vec<String>,
    state: Option<FittedState>,
}

impl Preprocessor {
    /// The transform used for flight fares: every numeric and categorical
    /// column of the schema, in schema order.
    pub fn flight_default() -> Self {
        Self {
            numeric: NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|c| c.to_string()).collect(),
            state: None,
        }
    }

    /// Declare a transform over explicit column groups.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if a column is unknown, listed
    /// twice, or does not have the role of the group it is listed in.
    pub fn new<S: AsRef<str>>(numeric: &[S], categorical: &[S]) -> Result<Self> {
        if numeric.is_empty() && categorical.is_empty() {
            return Err(LearningError::InvalidConfig(
                "preprocessor needs at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let groups = [
            (numeric, ColumnRole::Numeric),
            (categorical, ColumnRole::Categorical),
        ];
        for (columns, expected) in groups {
            for column in columns {
                let column = column.as_ref();
                if !seen.insert(column) {
                    return Err(LearningError::InvalidConfig(format!(
                        "column '{}' is listed more than once",
                        column
                    )));
                }
                match column_role(column) {
                    Some(role) if role == expected => {}
                    Some(role) => {
                        return Err(LearningError::InvalidConfig(format!(
                            "column '{}' has role {:?}, not {:?}",
                            column, role, expected
                        )));
                    }
                    None => {
                        return Err(LearningError::InvalidConfig(format!(
                            "unknown column '{}'",
                            column
                        )));
                    }
                }
            }
        }

        Ok(Self {
            numeric: numeric.iter().map(|c| c.as_ref().to_string()).collect(),
            categorical: categorical.iter().map(|c| c.as_ref().to_string()).collect(),
            state: None,
        })
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Learn scaling statistics and vocabularies from `records`.
    ///
    /// Refitting replaces any previously learned state.
    pub fn fit(&mut self, records: &[FlightRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(LearningError::InvalidData(
                "cannot fit preprocessor on zero records".to_string(),
            ));
        }

        let mut scalers = Vec::with_capacity(self.numeric.len());
        for column in &self.numeric {
            let values = numeric_values(records, column)?;
            scalers.push(StandardScaler::fit(values.iter().copied()));
        }

        let mut encoders = Vec::with_capacity(self.categorical.len());
        for column in &self.categorical {
            let values = categorical_values(records, column)?;
            encoders.push(OneHotEncoder::fit(values.into_iter()));
        }

        self.state = Some(FittedState { scalers, encoders });
        info!(
            "Preprocessor fitted on {} records ({} output features)",
            records.len(),
            self.n_features_out()?
        );
        Ok(())
    }

    /// Transform `records` into a `(records.len(), n_features_out)` matrix.
    pub fn transform(&self, records: &[FlightRecord]) -> Result<Array2<f64>> {
        let state = self.state()?;
        let width = self.n_features_out()?;
        let mut matrix = Array2::<f64>::zeros((records.len(), width));

        for (col, (column, scaler)) in self.numeric.iter().zip(&state.scalers).enumerate() {
            let values = numeric_values(records, column)?;
            for (row, value) in values.into_iter().enumerate() {
                matrix[[row, col]] = scaler.apply(value);
            }
        }

        let mut offset = self.numeric.len();
        let mut unseen = 0usize;
        for (column, encoder) in self.categorical.iter().zip(&state.encoders) {
            let values = categorical_values(records, column)?;
            for (row, value) in values.into_iter().enumerate() {
                match encoder.position(value) {
                    Some(position) => matrix[[row, offset + position]] = 1.0,
                    None => unseen += 1,
                }
            }
            offset += encoder.categories.len();
        }

        if unseen > 0 {
            debug!("{} unseen category values encoded as all zeros", unseen);
        }
        Ok(matrix)
    }

    /// Fit on `records` and return their transformed matrix.
    pub fn fit_transform(&mut self, records: &[FlightRecord]) -> Result<Array2<f64>> {
        self.fit(records)?;
        self.transform(records)
    }

    /// Width of the transformed matrix.
    pub fn n_features_out(&self) -> Result<usize> {
        let state = self.state()?;
        Ok(self.numeric.len()
            + state
                .encoders
                .iter()
                .map(|e| e.categories.len())
                .sum::<usize>())
    }

    /// Names of the output columns, in matrix order.
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let state = self.state()?;
        let mut names = self.numeric.clone();
        for (column, encoder) in self.categorical.iter().zip(&state.encoders) {
            names.extend(
                encoder
                    .categories
                    .iter()
                    .map(|category| format!("{}_{}", column, category)),
            );
        }
        Ok(names)
    }

    /// Persist the preprocessor (fitted or not).
    pub fn save(&self, path: &Path) -> Result<()> {
        save_artifact(self, path)
    }

    /// Load a preprocessor written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        load_artifact(path)
    }

    fn state(&self) -> Result<&FittedState> {
        self.state
            .as_ref()
            .ok_or(LearningError::NotFitted("Preprocessor"))
    }
}

fn numeric_values(records: &[FlightRecord], column: &str) -> Result<Vec<f64>> {
    records
        .iter()
        .map(|record| {
            record.numeric(column).ok_or_else(|| {
                LearningError::InvalidData(format!("'{}' is not a numeric column", column))
            })
        })
        .collect()
}

fn categorical_values<'a>(records: &'a [FlightRecord], column: &str) -> Result<Vec<&'a str>> {
    records
        .iter()
        .map(|record| {
            record.categorical(column).ok_or_else(|| {
                LearningError::InvalidData(format!("'{}' is not a categorical column", column))
            })
        })
        .collect()
}

static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(airline: &str, class: &str, duration: i64, days_left: i64) -> FlightRecord {
        FlightRecord {
            airline: airline.to_string(),
            source_city: "Delhi".to_string(),
            departure_time: "Morning".to_string(),
            stops: "zero".to_string(),
            arrival_time: "Evening".to_string(),
            destination_city: "Mumbai".to_string(),
            class: class.to_string(),
            duration,
            days_left,
        }
    }

    fn training_records() -> Vec<FlightRecord> {
        vec![
            record("Vistara", "Economy", 120, 10),
            record("Indigo", "Business", 180, 20),
            record("SpiceJet", "Economy", 150, 30),
        ]
    }

    #[test]
    fn test_flight_default_columns() {
        let preprocessor = Preprocessor::flight_default();
        assert_eq!(preprocessor.numeric_columns(), &["duration", "days_left"]);
        assert_eq!(preprocessor.categorical_columns().len(), 7);
        assert!(!preprocessor.is_fitted());
    }

    #[test]
    fn test_new_rejects_role_mismatch() {
        let err = Preprocessor::new(&["airline"], &["class"]).unwrap_err();
        assert!(matches!(err, LearningError::InvalidConfig(_)));
        assert!(err.to_string().contains("airline"));
    }

    #[test]
    fn test_new_rejects_unknown_and_target_columns() {
        assert!(Preprocessor::new(&["seats"], &[]).is_err());
        assert!(Preprocessor::new(&["price"], &[]).is_err());
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = Preprocessor::new(&["duration", "duration"], &[]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_transform_before_fit() {
        let preprocessor = Preprocessor::flight_default();
        let err = preprocessor.transform(&training_records()).unwrap_err();
        assert!(matches!(err, LearningError::NotFitted(_)));
        assert!(preprocessor.feature_names().is_err());
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let mut preprocessor = Preprocessor::flight_default();
        let err = preprocessor.fit(&[]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_standardization_uses_population_std() {
        let mut preprocessor = Preprocessor::new(&["duration"], &[]).unwrap();
        let matrix = preprocessor.fit_transform(&training_records()).unwrap();

        // mean 150, population std sqrt(600)
        let std = 600f64.sqrt();
        assert!((matrix[[0, 0]] - (-30.0 / std)).abs() < 1e-12);
        assert!((matrix[[1, 0]] - (30.0 / std)).abs() < 1e-12);
        assert!(matrix[[2, 0]].abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_centered_only() {
        let records = vec![record("Indigo", "Economy", 90, 5); 4];
        let mut preprocessor = Preprocessor::new(&["duration"], &[]).unwrap();
        let matrix = preprocessor.fit_transform(&records).unwrap();
        assert!(matrix.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_feature_names_and_width() {
        let mut preprocessor = Preprocessor::new(&["duration"], &["airline", "class"]).unwrap();
        preprocessor.fit(&training_records()).unwrap();

        assert_eq!(
            preprocessor.feature_names().unwrap(),
            vec![
                "duration",
                "airline_Indigo",
                "airline_SpiceJet",
                "airline_Vistara",
                "class_Business",
                "class_Economy",
            ]
        );
        assert_eq!(preprocessor.n_features_out().unwrap(), 6);
    }

    #[test]
    fn test_one_hot_indicators() {
        let mut preprocessor = Preprocessor::new(&[], &["airline"]).unwrap();
        let matrix = preprocessor.fit_transform(&training_records()).unwrap();

        // Sorted vocabulary: Indigo, SpiceJet, Vistara
        assert_eq!(matrix.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(matrix.row(1).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(matrix.row(2).to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unseen_category_is_all_zeros() {
        let mut preprocessor = Preprocessor::new(&[], &["airline", "class"]).unwrap();
        preprocessor.fit(&training_records()).unwrap();

        let matrix = preprocessor
            .transform(&[record("GO_FIRST", "Economy", 100, 3)])
            .unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let mut preprocessor = Preprocessor::flight_default();
        preprocessor.fit(&training_records()).unwrap();

        let first = preprocessor.transform(&training_records()).unwrap();
        let second = preprocessor.transform(&training_records()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_and_load_fitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("preprocessor.bin");

        let mut preprocessor = Preprocessor::flight_default();
        preprocessor.fit(&training_records()).unwrap();
        preprocessor.save(&path).unwrap();

        let restored = Preprocessor::load(&path).unwrap();
        assert!(restored.is_fitted());
        assert_eq!(restored, preprocessor);
    }
}
