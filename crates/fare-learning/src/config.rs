//! Configuration for the model trainer.
//!
//! This module provides [`TrainerConfig`] and its builder. The defaults train
//! the three candidate regressors with the hyperparameters the workflow has
//! always used (100 estimators, learning rate 0.1, seed 42).
//!
//! # Example
//!
//! ```
//! use fare_learning::TrainerConfig;
//!
//! let config = TrainerConfig::builder()
//!     .n_estimators(20)
//!     .random_seed(7)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.n_estimators, 20);
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};

/// Hyperparameters for the candidate regressors.
///
/// Use [`TrainerConfig::builder()`] to construct a configuration with the
/// builder pattern.
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](TrainerConfigBuilder::build):
/// - `n_estimators` and `boosting_max_depth` must be at least 1
/// - `learning_rate` must be in `(0.0, 1.0]`
/// - `boosting_l2` must be finite and non-negative
/// - `subsample` must be in `(0.0, 1.0]`
/// - `forest_max_depth`, when set, must be at least 1
/// - `max_bins` must be in `2..=255`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of trees in the forest and boosting rounds (default: 100).
    pub n_estimators: usize,

    /// Shrinkage applied to every boosting round (default: 0.1).
    pub learning_rate: f64,

    /// Seed for bootstrap sampling and row subsampling (default: 42).
    ///
    /// The same seed on the same training set yields identical models.
    pub random_seed: u64,

    /// Maximum depth of each boosted tree (default: 6).
    pub boosting_max_depth: usize,

    /// L2 regularization on boosted leaf values (default: 1.0).
    pub boosting_l2: f64,

    /// Fraction of rows drawn for each boosting round (default: 1.0).
    pub subsample: f64,

    /// Maximum depth of each forest tree (default: unlimited).
    pub forest_max_depth: Option<usize>,

    /// Maximum number of histogram bins per feature (default: 255).
    pub max_bins: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            random_seed: 42,
            boosting_max_depth: 6,
            boosting_l2: 1.0,
            subsample: 1.0,
            forest_max_depth: None,
            max_bins: 255,
        }
    }
}

impl TrainerConfig {
    /// Create a new builder for `TrainerConfig`.
    #[must_use]
    pub fn builder() -> TrainerConfigBuilder {
        TrainerConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(LearningError::InvalidConfig(
                "learning_rate must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.boosting_max_depth == 0 {
            return Err(LearningError::InvalidConfig(
                "boosting_max_depth must be at least 1".to_string(),
            ));
        }

        if !(self.boosting_l2.is_finite() && self.boosting_l2 >= 0.0) {
            return Err(LearningError::InvalidConfig(
                "boosting_l2 must be a non-negative number".to_string(),
            ));
        }

        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(LearningError::InvalidConfig(
                "subsample must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.forest_max_depth == Some(0) {
            return Err(LearningError::InvalidConfig(
                "forest_max_depth must be at least 1".to_string(),
            ));
        }

        if !(2..=255).contains(&self.max_bins) {
            return Err(LearningError::InvalidConfig(
                "max_bins must be between 2 and 255".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainerConfig`].
///
/// Created via [`TrainerConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    /// Set the number of trees and boosting rounds (default: 100).
    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    /// Set the boosting learning rate (default: 0.1).
    #[must_use]
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.learning_rate = rate;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the boosted tree depth (default: 6).
    #[must_use]
    pub fn boosting_max_depth(mut self, depth: usize) -> Self {
        self.config.boosting_max_depth = depth;
        self
    }

    /// Set the boosting leaf regularization (default: 1.0).
    #[must_use]
    pub fn boosting_l2(mut self, lambda: f64) -> Self {
        self.config.boosting_l2 = lambda;
        self
    }

    /// Set the boosting row subsample fraction (default: 1.0).
    #[must_use]
    pub fn subsample(mut self, fraction: f64) -> Self {
        self.config.subsample = fraction;
        self
    }

    /// Limit the depth of forest trees (default: unlimited).
    #[must_use]
    pub fn forest_max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.forest_max_depth = depth;
        self
    }

    /// Set the maximum number of histogram bins (default: 255).
    #[must_use]
    pub fn max_bins(mut self, bins: usize) -> Self {
        self.config.max_bins = bins;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] when any constraint listed on
    /// [`TrainerConfig`] is violated.
    pub fn build(self) -> Result<TrainerConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
