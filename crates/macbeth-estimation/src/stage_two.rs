//! Second pass: cross-sectional regressions.
//!
//! For every period t the cross-section of returns is regressed on the
//! first-pass betas, which stay fixed across periods:
//!
//! r_i,t = lambda0_t + lambda_t * beta_i + u_i,t
//!
//! The reported price of risk and pricing-error intercept are the time-series
//! means of lambda_t and lambda0_t over all periods with a complete
//! cross-section.

use crate::error::{EstimationError, Result};
use crate::ols::fit_line;
use crate::stage_one::BetaVector;
use macbeth_data::{AssetId, AssetReturnTable};
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cross-sectional estimate for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionalEstimate {
    /// Row index of the period in the return table
    pub period: usize,
    /// Slope (price of risk) for this period
    pub lambda: f64,
    /// Intercept for this period
    pub lambda0: f64,
}

/// Aggregated second-pass result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPremia {
    /// Mean price of risk
    pub lambda: f64,
    /// Mean intercept
    pub lambda0: f64,
    /// Per-period estimates that entered the means
    pub periods: Vec<CrossSectionalEstimate>,
    /// Periods skipped because of a missing return
    pub skipped: Vec<usize>,
}

impl RiskPremia {
    /// Number of periods averaged.
    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    /// Expected return implied by the cross-sectional line at `beta`.
    pub fn predict(&self, beta: f64) -> f64 {
        self.lambda0 + self.lambda * beta
    }
}

/// Run the second pass of returns on `betas`.
///
/// Returns are matched to betas by asset identifier, never by column
/// position, so the column order of `assets` is irrelevant.
///
/// # Errors
///
/// * [`EstimationError::KeyMismatch`] if a beta has no return column
/// * [`EstimationError::InsufficientData`] with fewer than 2 assets or no
///   complete period
/// * [`EstimationError::ZeroVariance`] if every beta is identical
pub fn stage_two(assets: &AssetReturnTable, betas: &BetaVector) -> Result<RiskPremia> {
    let missing: Vec<AssetId> = betas
        .assets()
        .filter(|a| !assets.contains(a))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(EstimationError::KeyMismatch { missing });
    }
    if betas.len() < 2 {
        return Err(EstimationError::InsufficientData {
            context: "cross-sectional regression (assets)",
            required: 2,
            actual: betas.len(),
        });
    }

    let (ids, x): (Vec<&AssetId>, Vec<f64>) = betas.iter().unzip();
    let x = Array1::from(x);
    let columns: Vec<&[Option<f64>]> = ids
        .iter()
        .filter_map(|a| assets.column(a))
        .collect();

    let fits: Vec<Option<Result<CrossSectionalEstimate>>> = (0..assets.n_periods())
        .into_par_iter()
        .map(|t| {
            let y: Option<Vec<f64>> = columns.iter().map(|c| c[t]).collect();
            y.map(|y| {
                fit_line(x.view(), ArrayView1::from(&y)).map(|fit| CrossSectionalEstimate {
                    period: t,
                    lambda: fit.slope,
                    lambda0: fit.intercept,
                })
            })
        })
        .collect();

    let mut periods = Vec::with_capacity(fits.len());
    let mut skipped = Vec::new();
    for (t, fit) in fits.into_iter().enumerate() {
        match fit {
            Some(estimate) => periods.push(estimate?),
            None => {
                debug!(period = t, "skipping period with missing returns");
                skipped.push(t);
            }
        }
    }

    if periods.is_empty() {
        return Err(EstimationError::InsufficientData {
            context: "cross-sectional regression (complete periods)",
            required: 1,
            actual: 0,
        });
    }

    let n = periods.len() as f64;
    let lambda = periods.iter().map(|p| p.lambda).sum::<f64>() / n;
    let lambda0 = periods.iter().map(|p| p.lambda0).sum::<f64>() / n;
    info!(
        assets = betas.len(),
        periods = periods.len(),
        skipped = skipped.len(),
        lambda,
        lambda0,
        "second pass complete"
    );

    Ok(RiskPremia {
        lambda,
        lambda0,
        periods,
        skipped,
    })
}
