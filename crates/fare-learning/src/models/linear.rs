//! Ordinary least squares with an intercept.

use super::{Regressor, check_training_data, check_width};
use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pivots smaller than this fraction of the largest diagonal entry are
/// treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearFit {
    coefficients: Array1<f64>,
    intercept: f64,
}

/// Closed-form least-squares linear model.
///
/// Solved through the normal equations of the centered data. Columns that are
/// linear combinations of others (for example a full one-hot group next to the
/// intercept) receive a zero coefficient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    fitted: Option<LinearFit>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Input width the model was fitted on.
    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.coefficients.len())
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        check_training_data(x, y)?;

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| LearningError::InvalidData("empty feature matrix".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| LearningError::InvalidData("empty target vector".to_string()))?;

        let xc = &x - &x_mean;
        let yc = &y - y_mean;
        let gram = xc.t().dot(&xc);
        let moments = xc.t().dot(&yc);

        let (coefficients, rank) = solve_normal_equations(gram, moments);
        if rank < coefficients.len() {
            debug!(
                "Design matrix has rank {} of {}; dependent columns get zero weight",
                rank,
                coefficients.len()
            );
        }

        let intercept = y_mean - x_mean.dot(&coefficients);
        self.fitted = Some(LinearFit {
            coefficients,
            intercept,
        });
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let fit = self
            .fitted
            .as_ref()
            .ok_or(LearningError::NotFitted("Linear Regression"))?;
        check_width(fit.coefficients.len(), x)?;
        Ok(x.dot(&fit.coefficients) + fit.intercept)
    }
}

/// Solve `a · w = b` for symmetric positive semi-definite `a` by Gauss–Jordan
/// elimination with partial pivoting.
///
/// Columns without a usable pivot are free and set to zero, which still gives
/// a least-squares solution when `a` and `b` come from normal equations.
/// Returns the solution and the numerical rank.
fn solve_normal_equations(mut a: Array2<f64>, mut b: Array1<f64>) -> (Array1<f64>, usize) {
    let p = b.len();
    let max_diag = (0..p).map(|i| a[[i, i]].abs()).fold(0.0, f64::max);
    let tolerance = PIVOT_TOLERANCE * max_diag.max(1.0);

    let mut pivot_columns = Vec::with_capacity(p);
    let mut row = 0;

    for col in 0..p {
        if row == p {
            break;
        }

        let mut pivot = row;
        for r in row + 1..p {
            if a[[r, col]].abs() > a[[pivot, col]].abs() {
                pivot = r;
            }
        }
        if a[[pivot, col]].abs() <= tolerance {
            continue;
        }

        if pivot != row {
            for k in 0..p {
                a.swap([pivot, k], [row, k]);
            }
            b.swap(pivot, row);
        }

        let d = a[[row, col]];
        for k in col..p {
            a[[row, k]] /= d;
        }
        b[row] /= d;

        for r in 0..p {
            if r == row {
                continue;
            }
            let factor = a[[r, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..p {
                a[[r, k]] -= factor * a[[row, k]];
            }
            b[r] -= factor * b[row];
        }

        pivot_columns.push(col);
        row += 1;
    }

    let mut solution = Array1::<f64>::zeros(p);
    for (i, &col) in pivot_columns.iter().enumerate() {
        solution[col] = b[i];
    }
    (solution, pivot_columns.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-8, "{a} != {b}");
    }

    #[test]
    fn test_recovers_exact_plane() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 3.0], [3.0, 1.0], [4.0, 5.0]];
        let y: Array1<f64> = x.rows().into_iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_close(coefficients[0], 2.0);
        assert_close(coefficients[1], -1.0);
        assert_close(model.intercept().unwrap(), 3.0);
    }

    #[test]
    fn test_collinear_one_hot_group() {
        // Two indicators that always sum to one are collinear with the intercept.
        let x = array![
            [1.0, 0.0, 0.5],
            [0.0, 1.0, 1.5],
            [1.0, 0.0, 2.5],
            [0.0, 1.0, 3.5],
            [1.0, 0.0, 4.5],
        ];
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|r| 10.0 + 4.0 * r[0] + 2.0 * r[2])
            .collect();

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        let predictions = model.predict(x.view()).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert_close(*p, *t);
        }
        assert!(model.coefficients().unwrap().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_constant_feature_gets_zero_weight() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_close(coefficients[0], 2.0);
        assert_eq!(coefficients[1], 0.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::new();
        let err = model.predict(array![[1.0]].view()).unwrap_err();
        assert!(matches!(err, LearningError::NotFitted(_)));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mut model = LinearRegression::new();
        model
            .fit(array![[1.0], [2.0]].view(), array![1.0, 2.0].view())
            .unwrap();
        let err = model.predict(array![[1.0, 2.0]].view()).unwrap_err();
        assert_eq!(err.error_code(), "INFERENCE_ERROR");
    }

    #[test]
    fn test_solver_reports_rank() {
        let a = array![[2.0, 2.0], [2.0, 2.0]];
        let b = array![4.0, 4.0];
        let (w, rank) = solve_normal_equations(a, b);
        assert_eq!(rank, 1);
        assert_close(2.0 * w[0] + 2.0 * w[1], 4.0);
    }
}
