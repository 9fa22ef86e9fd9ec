//! Gradient-boosted regression trees on squared loss.

use super::histogram::BinnedMatrix;
use super::tree::{RegressionTree, TreeParams};
use super::{Regressor, check_training_data, check_width};
use crate::config::TrainerConfig;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gradient boosting regressor.
///
/// Starts from the mean target and adds `n_estimators` depth-limited trees,
/// each fitted to the current residuals and shrunk by `learning_rate`. Leaf
/// values carry L2 regularization `λ`, so a leaf predicts
/// `Σ residual / (n + λ)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    lambda: f64,
    subsample: f64,
    max_bins: usize,
    random_seed: u64,
    base_score: f64,
    n_features: Option<usize>,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            max_depth: config.boosting_max_depth,
            lambda: config.boosting_l2,
            subsample: config.subsample,
            max_bins: config.max_bins,
            random_seed: config.random_seed,
            base_score: 0.0,
            n_features: None,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

impl Regressor for GradientBoosting {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        check_training_data(x, y)?;

        let binned = BinnedMatrix::from_matrix(x, self.max_bins);
        let params = TreeParams {
            max_depth: Some(self.max_depth),
            lambda: self.lambda,
            ..TreeParams::default()
        };
        let n = binned.n_rows();
        let sample_size = ((n as f64 * self.subsample).ceil() as usize).clamp(1, n);
        let mut rng = StdRng::seed_from_u64(self.random_seed);

        let base_score = y.sum() / n as f64;
        let mut predictions = Array1::from_elem(n, base_score);
        let mut residuals = Array1::<f64>::zeros(n);
        let mut rows: Vec<usize> = (0..n).collect();

        let mut trees = Vec::with_capacity(self.n_estimators);
        for round in 0..self.n_estimators {
            residuals.assign(&(&y - &predictions));

            if sample_size < n {
                rows = index::sample(&mut rng, n, sample_size).into_vec();
            }

            let tree = RegressionTree::fit(&binned, residuals.view(), &mut rows, &params);
            for (i, prediction) in predictions.iter_mut().enumerate() {
                *prediction += self.learning_rate * tree.predict_binned(&binned, i);
            }
            debug!("Boosting round {} added {} leaves", round + 1, tree.n_leaves());
            trees.push(tree);
        }

        info!("Gradient boosting fitted: {} rounds", trees.len());
        self.base_score = base_score;
        self.trees = trees;
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let n_features = self
            .n_features
            .ok_or(LearningError::NotFitted("Gradient Boosting"))?;
        check_width(n_features, x)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.base_score
                    + self.learning_rate
                        * self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::mean_squared_error;
    use ndarray::{Array2, array};

    fn data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((60, 2), |(i, j)| {
            if j == 0 { i as f64 } else { ((i * 7) % 5) as f64 }
        });
        let y = x
            .rows()
            .into_iter()
            .map(|r| if r[0] < 30.0 { 50.0 + r[1] } else { 200.0 - r[1] })
            .collect();
        (x, y)
    }

    #[test]
    fn test_more_rounds_reduce_training_error() {
        let (x, y) = data();
        let few = TrainerConfig::builder().n_estimators(5).build().unwrap();
        let many = TrainerConfig::builder().n_estimators(60).build().unwrap();

        let mut short = GradientBoosting::new(&few);
        let mut long = GradientBoosting::new(&many);
        short.fit(x.view(), y.view()).unwrap();
        long.fit(x.view(), y.view()).unwrap();

        let y_vec = y.to_vec();
        let short_mse = mean_squared_error(&y_vec, &short.predict(x.view()).unwrap().to_vec()).unwrap();
        let long_mse = mean_squared_error(&y_vec, &long.predict(x.view()).unwrap().to_vec()).unwrap();
        assert!(long_mse < short_mse);
        assert!(long_mse < 10.0);
    }

    #[test]
    fn test_single_round_moves_toward_target() {
        let (x, y) = data();
        let config = TrainerConfig::builder().n_estimators(1).build().unwrap();
        let mut model = GradientBoosting::new(&config);
        model.fit(x.view(), y.view()).unwrap();

        // One shrunken round moves only 10% of the way from the mean.
        let mean = y.sum() / y.len() as f64;
        let prediction = model.predict(array![[0.0, 0.0]].view()).unwrap()[0];
        assert!(prediction < mean);
        assert!(prediction > mean - 0.1 * (mean - 50.0) - 1.0);
    }

    #[test]
    fn test_subsampling_is_seeded() {
        let (x, y) = data();
        let config = TrainerConfig::builder()
            .n_estimators(10)
            .subsample(0.5)
            .random_seed(3)
            .build()
            .unwrap();

        let mut a = GradientBoosting::new(&config);
        let mut b = GradientBoosting::new(&config);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();
        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = GradientBoosting::new(&TrainerConfig::default());
        assert!(!model.is_fitted());
        let err = model.predict(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(err, LearningError::NotFitted(_)));
    }
}
