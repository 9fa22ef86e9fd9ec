//! Configuration for splitting the cleaned snapshot into train and test sets.
//!
//! Uses the builder pattern with validation on `build()`.

use serde::{Deserialize, Serialize};

/// Configuration for [`train_test_split`](crate::split::train_test_split).
///
/// # Example
///
/// ```rust
/// use fare_processing::SplitConfig;
///
/// let config = SplitConfig::builder()
///     .test_size(0.25)
///     .random_seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.test_size, 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of rows held out for evaluation, in (0.0, 1.0).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the row shuffle. The same seed yields the same split.
    /// Default: 42
    pub random_seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),
}

/// Builder for [`SplitConfig`].
#[derive(Debug, Default)]
pub struct SplitConfigBuilder {
    test_size: Option<f64>,
    random_seed: Option<u64>,
}

impl SplitConfigBuilder {
    /// Set the held-out fraction.
    pub fn test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    /// Set the shuffle seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<SplitConfig, ConfigValidationError> {
        let defaults = SplitConfig::default();
        let config = SplitConfig {
            test_size: self.test_size.unwrap_or(defaults.test_size),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
