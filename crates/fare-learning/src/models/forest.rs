//! Bagged ensemble of regression trees.

use super::histogram::BinnedMatrix;
use super::tree::{RegressionTree, TreeParams};
use super::{Regressor, check_training_data, check_width};
use crate::config::TrainerConfig;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Random forest regressor.
///
/// Every tree is grown on a bootstrap sample of the training rows, drawn from
/// an RNG seeded with `random_seed`, considering all features at every split.
/// The prediction is the mean of the trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    max_bins: usize,
    random_seed: u64,
    n_features: Option<usize>,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            max_depth: config.forest_max_depth,
            max_bins: config.max_bins,
            random_seed: config.random_seed,
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

impl Regressor for RandomForest {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        check_training_data(x, y)?;

        let binned = BinnedMatrix::from_matrix(x, self.max_bins);
        let params = TreeParams {
            max_depth: self.max_depth,
            ..TreeParams::default()
        };
        let n = binned.n_rows();
        let mut rng = StdRng::seed_from_u64(self.random_seed);
        let mut rows = vec![0usize; n];

        let mut trees = Vec::with_capacity(self.n_estimators);
        for index in 0..self.n_estimators {
            for slot in rows.iter_mut() {
                *slot = rng.gen_range(0..n);
            }
            let tree = RegressionTree::fit(&binned, y, &mut rows, &params);
            debug!("Forest tree {} grown with {} leaves", index + 1, tree.n_leaves());
            trees.push(tree);
        }

        info!("Random forest fitted: {} trees", trees.len());
        self.trees = trees;
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let n_features = self
            .n_features
            .ok_or(LearningError::NotFitted("Random Forest"))?;
        check_width(n_features, x)?;

        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn config(n_estimators: usize, seed: u64) -> TrainerConfig {
        TrainerConfig::builder()
            .n_estimators(n_estimators)
            .random_seed(seed)
            .build()
            .unwrap()
    }

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 3) as f64 });
        let y = Array1::from_shape_fn(40, |i| if i < 20 { 100.0 } else { 300.0 });
        (x, y)
    }

    #[test]
    fn test_forest_learns_step() {
        let (x, y) = step_data();
        let mut forest = RandomForest::new(&config(25, 42));
        forest.fit(x.view(), y.view()).unwrap();

        assert_eq!(forest.n_trees(), 25);
        let predictions = forest.predict(array![[2.0, 2.0], [37.0, 1.0]].view()).unwrap();
        assert!((predictions[0] - 100.0).abs() < 20.0);
        assert!((predictions[1] - 300.0).abs() < 20.0);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = step_data();
        let mut a = RandomForest::new(&config(10, 7));
        let mut b = RandomForest::new(&config(10, 7));
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
    }

    #[test]
    fn test_predictions_stay_within_target_range() {
        let (x, y) = step_data();
        let mut forest = RandomForest::new(&config(10, 1));
        forest.fit(x.view(), y.view()).unwrap();

        let predictions = forest.predict(array![[-50.0, 0.0], [500.0, 2.0]].view()).unwrap();
        assert!(predictions.iter().all(|p| (100.0..=300.0).contains(p)));
    }

    #[test]
    fn test_predict_before_fit() {
        let forest = RandomForest::new(&TrainerConfig::default());
        assert!(!forest.is_fitted());
        assert!(forest.predict(array![[1.0, 2.0]].view()).is_err());
    }
}
