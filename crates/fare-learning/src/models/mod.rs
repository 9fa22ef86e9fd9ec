//! Candidate regressors.
//!
//! Three model families are trained and compared on every run:
//!
//! | Kind                                  | Display name          |
//! |---------------------------------------|-----------------------|
//! | [`LinearRegression`]                  | `Linear Regression`   |
//! | [`RandomForest`]                      | `Random Forest`       |
//! | [`GradientBoosting`]                  | `Gradient Boosting`   |
//!
//! All of them implement [`Regressor`] and are wrapped in [`TrainedModel`] so
//! the trainer and the serving form can treat them uniformly. A model written
//! to disk is a [`NamedModel`], which keeps the display name next to the
//! fitted parameters.

mod boosting;
mod forest;
mod histogram;
mod linear;
mod tree;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use linear::LinearRegression;
pub use tree::RegressionTree;

use crate::artifacts::{load_artifact, save_artifact};
use crate::config::TrainerConfig;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A model that can be fitted on a dense feature matrix and predict from one.
pub trait Regressor {
    /// Fit on `x` (one row per sample) and targets `y`.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>>;
}

pub(crate) fn check_training_data(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(LearningError::InvalidData(
            "cannot fit on zero rows".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(LearningError::InvalidData(format!(
            "feature matrix has {} rows but target has {}",
            x.nrows(),
            y.len()
        )));
    }
    if let Some(position) = y.iter().position(|v| !v.is_finite()) {
        return Err(LearningError::InvalidData(format!(
            "target value at row {} is not finite",
            position
        )));
    }
    Ok(())
}

pub(crate) fn check_width(expected: usize, x: ArrayView2<'_, f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(LearningError::InferenceError(format!(
            "model expects {} features, got {}",
            expected,
            x.ncols()
        )));
    }
    Ok(())
}

/// The candidate model families, in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    /// Every kind, in the order models are trained, evaluated and reported.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Display name used in the metrics table and artifact names.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the candidate regressors, fitted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl TrainedModel {
    /// An unfitted model of `kind` configured from `config`.
    pub fn new(kind: ModelKind, config: &TrainerConfig) -> Self {
        match kind {
            ModelKind::LinearRegression => Self::LinearRegression(LinearRegression::new()),
            ModelKind::RandomForest => Self::RandomForest(RandomForest::new(config)),
            ModelKind::GradientBoosting => Self::GradientBoosting(GradientBoosting::new(config)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::LinearRegression(_) => ModelKind::LinearRegression,
            Self::RandomForest(_) => ModelKind::RandomForest,
            Self::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            Self::LinearRegression(m) => m.is_fitted(),
            Self::RandomForest(m) => m.is_fitted(),
            Self::GradientBoosting(m) => m.is_fitted(),
        }
    }

    /// Input width the model was fitted on, `None` before fitting.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Self::LinearRegression(m) => m.n_features(),
            Self::RandomForest(m) => m.n_features(),
            Self::GradientBoosting(m) => m.n_features(),
        }
    }
}

impl Regressor for TrainedModel {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        match self {
            Self::LinearRegression(m) => m.fit(x, y),
            Self::RandomForest(m) => m.fit(x, y),
            Self::GradientBoosting(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        match self {
            Self::LinearRegression(m) => m.predict(x),
            Self::RandomForest(m) => m.predict(x),
            Self::GradientBoosting(m) => m.predict(x),
        }
    }
}

/// A fitted model together with the name it was trained under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedModel {
    pub name: String,
    pub model: TrainedModel,
}

impl NamedModel {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            name: model.kind().label().to_string(),
            model,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_artifact(self, path)
    }

    /// Load a model artifact, rejecting one that was never fitted or whose
    /// name does not match the model it holds.
    pub fn load(path: &Path) -> Result<Self> {
        let named: Self = load_artifact(path)?;
        if !named.model.is_fitted() {
            return Err(LearningError::NotFitted("Model artifact"));
        }
        if ModelKind::from_label(&named.name) != Some(named.model.kind()) {
            return Err(LearningError::InvalidData(format!(
                "model artifact '{}' holds a {} model",
                named.name,
                named.model.kind()
            )));
        }
        Ok(named)
    }

    pub fn n_features(&self) -> Option<usize> {
        self.model.n_features()
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        self.model.predict(x)
    }
}

static_assertions::assert_impl_all!(NamedModel: Send, Sync);
