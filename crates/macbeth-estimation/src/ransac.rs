//! RANSAC robust line fit.
//!
//! Random Sample Consensus: repeatedly draw two points, draw the line through
//! them and count the points within `residual_threshold` of it. The candidate
//! with the largest consensus set wins (ties go to the smaller absolute
//! residual sum over that set) and the final line is an OLS fit on its
//! inliers only.
//!
//! Sampling uses an explicit random source. [`robust_fit`] seeds a
//! [`StdRng`] from the configuration; [`robust_fit_with_rng`] takes any
//! [`Rng`].

use crate::error::{EstimationError, Result};
use crate::ols::{LineFit, fit_line};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// RANSAC configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Maximum absolute residual for a point to count as an inlier
    pub residual_threshold: f64,
    /// Seed for the sampling RNG
    pub random_seed: u64,
    /// Number of two-point samples to draw
    pub max_trials: usize,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            residual_threshold: 2.0,
            random_seed: 42,
            max_trials: 100,
        }
    }
}

impl RansacConfig {
    fn validate(&self) -> Result<()> {
        if !self.residual_threshold.is_finite() || self.residual_threshold <= 0.0 {
            return Err(EstimationError::InvalidParameter(format!(
                "residual_threshold must be finite and positive, got {}",
                self.residual_threshold
            )));
        }
        if self.max_trials == 0 {
            return Err(EstimationError::InvalidParameter(
                "max_trials must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a robust fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustFit {
    /// Slope of the OLS refit on the inliers
    pub slope: f64,
    /// Intercept of the OLS refit on the inliers
    pub intercept: f64,
    /// `true` for points in the winning consensus set, in input order
    pub inlier_mask: Vec<bool>,
    /// Trials drawn before stopping
    pub trials: usize,
}

impl RobustFit {
    /// Number of inliers.
    pub fn n_inliers(&self) -> usize {
        self.inlier_mask.iter().filter(|&&m| m).count()
    }

    /// Indices of points classified as outliers.
    pub fn outliers(&self) -> Vec<usize> {
        self.inlier_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| (!m).then_some(i))
            .collect()
    }

    /// Value of the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

struct Candidate {
    mask: Vec<bool>,
    n_inliers: usize,
    residual_sum: f64,
}

impl Candidate {
    fn beats(&self, other: &Self) -> bool {
        self.n_inliers > other.n_inliers
            || (self.n_inliers == other.n_inliers && self.residual_sum < other.residual_sum)
    }
}

/// Robust fit with an RNG seeded from `config.random_seed`.
pub fn robust_fit(x: &[f64], y: &[f64], config: &RansacConfig) -> Result<RobustFit> {
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    robust_fit_with_rng(x, y, config, &mut rng)
}

/// Robust fit drawing samples from `rng`.
///
/// # Errors
///
/// * [`EstimationError::DegenerateInput`] for fewer than 2 points or `x`/`y`
///   of different length
/// * [`EstimationError::NoConsensus`] if every sampled pair shared the same x
/// * [`EstimationError::InvalidParameter`] for an invalid configuration
pub fn robust_fit_with_rng<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    config: &RansacConfig,
    rng: &mut R,
) -> Result<RobustFit> {
    config.validate()?;
    if x.len() != y.len() {
        return Err(EstimationError::DegenerateInput(format!(
            "x has {} points, y has {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(EstimationError::DegenerateInput(format!(
            "need at least 2 points, got {n}"
        )));
    }

    let mut best: Option<Candidate> = None;
    let mut trials = 0;
    while trials < config.max_trials {
        trials += 1;
        let sample = index::sample(rng, n, 2);
        let (i, j) = (sample.index(0), sample.index(1));
        if x[i] == x[j] {
            continue;
        }
        let slope = (y[j] - y[i]) / (x[j] - x[i]);
        let line = LineFit {
            slope,
            intercept: y[i] - slope * x[i],
            n_obs: 2,
        };
        let candidate = consensus(&line, x, y, config.residual_threshold);
        if best.as_ref().is_none_or(|b| candidate.beats(b)) {
            best = Some(candidate);
        }
        if best.as_ref().is_some_and(|b| b.n_inliers == n) {
            break;
        }
    }

    let best = best.ok_or(EstimationError::NoConsensus { trials })?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .zip(&best.mask)
        .filter(|(_, inlier)| **inlier)
        .map(|((&xi, &yi), _)| (xi, yi))
        .unzip();
    let refit = fit_line(ArrayView1::from(&xs), ArrayView1::from(&ys))?;
    debug!(
        trials,
        inliers = best.n_inliers,
        outliers = n - best.n_inliers,
        slope = refit.slope,
        intercept = refit.intercept,
        "ransac fit complete"
    );

    Ok(RobustFit {
        slope: refit.slope,
        intercept: refit.intercept,
        inlier_mask: best.mask,
        trials,
    })
}

fn consensus(line: &LineFit, x: &[f64], y: &[f64], threshold: f64) -> Candidate {
    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| line.residual(xi, yi).abs())
        .collect();
    let mask: Vec<bool> = residuals.iter().map(|&r| r <= threshold).collect();
    let residual_sum = residuals
        .iter()
        .zip(&mask)
        .filter(|(_, inlier)| **inlier)
        .map(|(r, _)| r)
        .sum();
    Candidate {
        n_inliers: mask.iter().filter(|&&m| m).count(),
        mask,
        residual_sum,
    }
}
