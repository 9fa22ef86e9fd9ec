//! Seeded train/test split of the cleaned snapshot.

use crate::config::SplitConfig;
use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Shuffle the rows of `df` with the configured seed and split off
/// `ceil(rows * test_size)` rows for evaluation.
///
/// Both halves are guaranteed to be non-empty. Returns `(train, test)`.
pub fn train_test_split(df: &DataFrame, config: &SplitConfig) -> Result<(DataFrame, DataFrame)> {
    config
        .validate()
        .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

    let rows = df.height();
    if rows < 2 {
        return Err(ProcessingError::InvalidData(format!(
            "need at least 2 rows to split, got {}",
            rows
        )));
    }

    let mut indices: Vec<IdxSize> = (0..rows as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    indices.shuffle(&mut rng);

    let test_rows = ((rows as f64 * config.test_size).ceil() as usize).clamp(1, rows - 1);
    let (test_indices, train_indices) = indices.split_at(test_rows);

    let train = df.take(&IdxCa::from_vec("train".into(), train_indices.to_vec()))?;
    let test = df.take(&IdxCa::from_vec("test".into(), test_indices.to_vec()))?;

    debug!(
        "Split {} rows into {} train / {} test",
        rows,
        train.height(),
        test.height()
    );
    Ok((train, test))
}
