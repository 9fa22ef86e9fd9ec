//! fare-learning: feature preprocessing, regressors and model selection for
//! flight fare prediction.
//!
//! This crate is the second and third stage of the fare prediction workflow.
//! It turns the cleaned snapshot produced by `fare-processing` into a fitted
//! preprocessor and a set of trained regressors, and picks the best one.
//!
//! # Features
//!
//! - **Preprocessor**: Standardizes numeric columns and one-hot encodes
//!   categorical columns, driven by the static column-role table
//! - **Regressors**: Ordinary least squares, a random forest and gradient
//!   boosted trees, all implemented on `ndarray`
//! - **Model Selection**: Held-out MSE and R² per model, best model by R²
//! - **Artifacts**: bincode-encoded models and preprocessor, a CSV metrics
//!   table and a JSON training report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fare_learning::{Preprocessor, Trainer, TrainerConfig};
//! use fare_processing::{ProjectPaths, SplitConfig};
//!
//! let paths = ProjectPaths::from_current_dir()?;
//!
//! // Stage 2: declare the transform
//! Preprocessor::flight_default().save(&paths.preprocessor())?;
//!
//! // Stage 3: train, evaluate and persist
//! let trainer = Trainer::new(TrainerConfig::default(), SplitConfig::default());
//! let outcome = trainer.run(&paths)?;
//! println!("Best model: {}", outcome.best_model);
//! ```
//!
//! # Architecture
//!
//! ```text
//! processed_data.parquet
//!         │ train_test_split
//!         ▼
//!   train records ──► Preprocessor::fit_transform ──► Regressor::fit (×3)
//!   test records  ──► Preprocessor::transform     ──► Regressor::predict
//!                                                        │
//!                                                        ▼
//!                                              MetricsTable ──► select_best
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LearningError>`]. Errors raised
//! by the loading stage are wrapped in [`LearningError::Processing`] and keep
//! their error code.
//!
//! # Determinism
//!
//! Every random choice (split, bootstrap samples, row subsampling) is drawn
//! from a seeded RNG. The same snapshot and seeds reproduce the same models
//! and metrics.

pub mod artifacts;
mod config;
mod error;
pub mod metrics;
pub mod models;
mod preprocessor;
pub mod trainer;

// Re-export public API
//
// Configuration types
pub use config::{TrainerConfig, TrainerConfigBuilder};
// Error types
pub use error::{LearningError, Result as LearningResult};
// Metrics
pub use metrics::{MetricsTable, ModelMetrics, mean_squared_error, r2_score};
// Models
pub use models::{
    GradientBoosting, LinearRegression, ModelKind, NamedModel, RandomForest, Regressor,
    TrainedModel,
};
// Preprocessing
pub use preprocessor::Preprocessor;
// Training
pub use trainer::{
    Trainer, TrainingOutcome, TrainingReport, evaluate_models, save_best_model, save_models,
    select_best, train_models,
};
