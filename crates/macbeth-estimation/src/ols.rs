//! Closed-form simple linear regression.
//!
//! Both Fama-MacBeth passes and the RANSAC refit reduce to a single-regressor
//! OLS fit `y = intercept + slope * x`, solved analytically:
//!
//! slope = S_xy / S_xx, intercept = mean(y) - slope * mean(x)
//!
//! No iterative solver is involved, so repeated fits on identical inputs are
//! bit-identical.

use crate::error::{EstimationError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    /// Slope coefficient
    pub slope: f64,
    /// Intercept coefficient
    pub intercept: f64,
    /// Number of observations used
    pub n_obs: usize,
}

impl LineFit {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Residual `y - fitted(x)`.
    pub fn residual(&self, x: f64, y: f64) -> f64 {
        y - self.predict(x)
    }
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
///
/// # Errors
///
/// * [`EstimationError::DegenerateInput`] if `x` and `y` differ in length
/// * [`EstimationError::InsufficientData`] with fewer than 2 observations
/// * [`EstimationError::ZeroVariance`] if `x` is constant
pub fn fit_line(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Result<LineFit> {
    if x.len() != y.len() {
        return Err(EstimationError::DegenerateInput(format!(
            "x has {} points, y has {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(EstimationError::InsufficientData {
            context: "least squares line",
            required: 2,
            actual: n,
        });
    }

    let x_mean = x.sum() / n as f64;
    let y_mean = y.sum() / n as f64;
    let dx = &x - x_mean;
    let dy = &y - y_mean;
    let sxx = dx.dot(&dx);

    // A constant series only leaves rounding noise of order eps * mean in each
    // deviation.
    let noise = 4.0 * f64::EPSILON * x_mean.abs();
    if sxx <= n as f64 * noise * noise {
        return Err(EstimationError::ZeroVariance("least squares regressor"));
    }

    let slope = dx.dot(&dy) / sxx;
    Ok(LineFit {
        slope,
        intercept: y_mean - slope * x_mean,
        n_obs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_exact_line() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = x.mapv(|v| 2.0 + 3.0 * v);
        let fit = fit_line(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(fit.slope, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 2.0, epsilon = 1e-12);
        assert_eq!(fit.n_obs, 5);
        assert_abs_diff_eq!(fit.predict(10.0), 32.0, epsilon = 1e-10);
    }

    #[test]
    fn test_noisy_line() {
        // Hand-computed: mean x = 2, mean y = 10/3, Sxy = 4, Sxx = 2.
        let x = array![1.0, 2.0, 3.0];
        let y = array![1.0, 4.0, 5.0];
        let fit = fit_line(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, -2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.residual(2.0, 4.0), 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_points() {
        let x = array![0.0, 2.0];
        let y = array![1.0, 0.0];
        let fit = fit_line(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(fit.slope, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_small_spread_around_large_mean() {
        let x = array![1e8, 1e8 + 1.0, 1e8 + 2.0];
        let y = array![1.0, 2.0, 3.0];
        let fit = fit_line(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(fit.slope, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.predict(1e8), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_regressor() {
        let x = array![0.1, 0.1, 0.1];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            fit_line(x.view(), y.view()),
            Err(EstimationError::ZeroVariance(_))
        ));
    }

    #[test]
    fn test_too_few_points() {
        let x = array![1.0];
        let y = array![1.0];
        assert!(matches!(
            fit_line(x.view(), y.view()),
            Err(EstimationError::InsufficientData { actual: 1, .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let x = array![1.0, 2.0];
        let y = array![1.0];
        assert!(matches!(
            fit_line(x.view(), y.view()),
            Err(EstimationError::DegenerateInput(_))
        ));
    }
}
