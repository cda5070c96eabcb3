//! First pass: time-series regressions.
//!
//! Every asset's return series is regressed on the risk factor over time,
//! giving one (alpha, beta) pair per asset:
//!
//! r_i,t = alpha_i + beta_i * f_t + e_i,t
//!
//! Assets whose aligned window contains a missing value are left out of the
//! result entirely. They are neither imputed nor reported as errors.

use crate::align::{align, complete};
use crate::error::Result;
use crate::ols::fit_line;
use macbeth_data::{AssetId, AssetReturnTable, RiskFactorSeries};
use ndarray::ArrayView1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Intercept and slope of one asset's time-series regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaBeta {
    /// Intercept (pricing error under the factor model)
    pub alpha: f64,
    /// Slope (factor exposure)
    pub beta: f64,
    /// Periods used in the regression
    pub n_obs: usize,
}

/// Factor exposures keyed by asset, ordered by asset identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaVector(BTreeMap<AssetId, f64>);

impl BetaVector {
    /// Empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Beta of one asset.
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.0.get(asset).copied()
    }

    /// Insert or replace a beta.
    pub fn insert(&mut self, asset: impl Into<AssetId>, beta: f64) -> Option<f64> {
        self.0.insert(asset.into(), beta)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no asset has a beta.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `asset` has a beta.
    pub fn contains(&self, asset: &str) -> bool {
        self.0.contains_key(asset)
    }

    /// Asset identifiers in order.
    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.0.keys()
    }

    /// `(asset, beta)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, f64)> {
        self.0.iter().map(|(a, b)| (a, *b))
    }

    /// Copy without the given assets.
    pub fn without<S: AsRef<str>>(&self, removed: &[S]) -> Self {
        let mut kept = self.0.clone();
        for asset in removed {
            kept.remove(asset.as_ref());
        }
        Self(kept)
    }

    /// `(asset, beta)` pairs sorted by beta, ties broken by asset identifier.
    pub fn sorted_by_beta(&self) -> Vec<(&AssetId, f64)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|(a, x), (b, y)| x.total_cmp(y).then_with(|| a.cmp(b)));
        pairs
    }
}

impl<A: Into<AssetId>> FromIterator<(A, f64)> for BetaVector {
    fn from_iter<I: IntoIterator<Item = (A, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(a, b)| (a.into(), b)).collect())
    }
}

/// Stage-one output: one [`AlphaBeta`] per asset with complete data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirstPassEstimates {
    estimates: BTreeMap<AssetId, AlphaBeta>,
}

impl FirstPassEstimates {
    /// Estimate for one asset.
    pub fn get(&self, asset: &str) -> Option<&AlphaBeta> {
        self.estimates.get(asset)
    }

    /// Number of estimated assets.
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Whether no asset could be estimated.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// `(asset, estimate)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &AlphaBeta)> {
        self.estimates.iter()
    }

    /// Betas as a [`BetaVector`] for the second pass.
    pub fn betas(&self) -> BetaVector {
        self.estimates.iter().map(|(a, e)| (a.clone(), e.beta)).collect()
    }

    /// Alphas keyed by asset.
    pub fn alphas(&self) -> BTreeMap<AssetId, f64> {
        self.estimates
            .iter()
            .map(|(a, e)| (a.clone(), e.alpha))
            .collect()
    }
}

/// Run the first pass over every asset column.
///
/// The factor is trimmed by `factor_offset` periods and each asset by
/// `asset_offset` periods before fitting.
///
/// # Errors
///
/// An alignment failure or a degenerate regression (fewer than two periods,
/// constant factor) on a complete asset aborts the pass with
/// [`EstimationError::Asset`](crate::EstimationError::Asset) naming it.
pub fn stage_one(
    risk_factor: &RiskFactorSeries,
    assets: &AssetReturnTable,
    asset_offset: usize,
    factor_offset: usize,
) -> Result<FirstPassEstimates> {
    let factor = risk_factor.values();
    let factor_window = factor.get(factor_offset..).unwrap_or_default();
    if factor_window.iter().any(Option::is_none) {
        warn!(
            factor = risk_factor.name(),
            factor_offset, "risk factor has missing values after alignment; all assets will be skipped"
        );
    }

    let columns: Vec<(&str, &[Option<f64>])> = assets.iter_columns().collect();
    let fits: Vec<Result<Option<AlphaBeta>>> = columns
        .par_iter()
        .map(|(asset, returns)| {
            fit_asset(factor, returns, factor_offset, asset_offset)
                .map_err(|e| e.for_asset(asset))
        })
        .collect();

    let mut estimates = BTreeMap::new();
    for ((asset, _), fit) in columns.iter().zip(fits) {
        match fit? {
            Some(estimate) => {
                estimates.insert((*asset).to_string(), estimate);
            }
            None => debug!(asset, "skipping asset with missing observations"),
        }
    }

    info!(
        factor = risk_factor.name(),
        estimated = estimates.len(),
        skipped = columns.len() - estimates.len(),
        "first pass complete"
    );
    Ok(FirstPassEstimates { estimates })
}

fn fit_asset(
    factor: &[Option<f64>],
    returns: &[Option<f64>],
    factor_offset: usize,
    asset_offset: usize,
) -> Result<Option<AlphaBeta>> {
    let (x, y) = align(factor, returns, factor_offset, asset_offset)?;
    let (Some(x), Some(y)) = (complete(x), complete(y)) else {
        return Ok(None);
    };
    let fit = fit_line(ArrayView1::from(&x), ArrayView1::from(&y))?;
    Ok(Some(AlphaBeta {
        alpha: fit.intercept,
        beta: fit.slope,
        n_obs: fit.n_obs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimationError;
    use approx::assert_abs_diff_eq;

    fn table(columns: Vec<(&str, Vec<Option<f64>>)>) -> AssetReturnTable {
        let n = columns.first().map_or(0, |(_, c)| c.len());
        AssetReturnTable::new(
            "year",
            (0..n).map(|t| (2000 + t).to_string()).collect(),
            columns
                .into_iter()
                .map(|(a, c)| (a.to_string(), c))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_recovers_known_coefficients() {
        let factor = RiskFactorSeries::from_f64("x", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = [1.0, 2.0, 3.0, 4.0, 5.0].map(|x| Some(2.0 + 3.0 * x)).to_vec();
        let assets = table(vec![("a", y)]);

        let estimates = stage_one(&factor, &assets, 0, 0).unwrap();
        let ab = estimates.get("a").unwrap();
        assert_abs_diff_eq!(ab.beta, 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ab.alpha, 2.0, epsilon = 1e-10);
        assert_eq!(ab.n_obs, 5);
    }

    #[test]
    fn test_skips_assets_with_gaps() {
        let factor = RiskFactorSeries::from_f64("x", &[1.0, 2.0, 3.0, 4.0]);
        let assets = table(vec![
            ("a", vec![Some(1.0), None, Some(3.0), Some(4.0)]),
            ("b", vec![Some(1.0), Some(2.5), Some(2.0), Some(4.0)]),
        ]);

        let estimates = stage_one(&factor, &assets, 0, 0).unwrap();
        assert_eq!(estimates.len(), 1);
        assert!(estimates.get("a").is_none());
        assert!(estimates.get("b").is_some());
        assert_eq!(estimates.betas().assets().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_gap_before_offset_is_ignored() {
        let factor = RiskFactorSeries::from_f64("x", &[f64::NAN, 1.0, 2.0, 3.0]);
        let assets = table(vec![("a", vec![None, Some(1.0), Some(2.0), Some(4.0)])]);
        let estimates = stage_one(&factor, &assets, 1, 1).unwrap();
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates.get("a").unwrap().n_obs, 3);
    }

    #[test]
    fn test_missing_factor_skips_everything() {
        let factor = RiskFactorSeries::from_f64("x", &[f64::NAN, 1.0, 2.0]);
        let assets = table(vec![("a", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        assert!(stage_one(&factor, &assets, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_alignment_failure_names_asset() {
        let factor = RiskFactorSeries::from_f64("x", &[1.0, 2.0, 3.0, 4.0]);
        let assets = table(vec![("a", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        let err = stage_one(&factor, &assets, 0, 0).unwrap_err();
        match err {
            EstimationError::Asset { asset, source } => {
                assert_eq!(asset, "a");
                assert!(matches!(*source, EstimationError::Alignment { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sorted_by_beta_breaks_ties_by_id() {
        let betas: BetaVector = [("c", 1.0), ("a", 1.0), ("b", -2.0)].into_iter().collect();
        let sorted: Vec<&str> = betas
            .sorted_by_beta()
            .into_iter()
            .map(|(a, _)| a.as_str())
            .collect();
        assert_eq!(sorted, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_alphas_follow_betas() {
        let factor = RiskFactorSeries::from_f64("x", &[0.0, 1.0, 2.0]);
        let assets = table(vec![
            ("a", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ("b", vec![Some(0.0), Some(-1.0), Some(-2.0)]),
        ]);
        let estimates = stage_one(&factor, &assets, 0, 0).unwrap();
        let alphas = estimates.alphas();
        assert_abs_diff_eq!(alphas["a"], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(alphas["b"], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(estimates.betas().get("b").unwrap(), -1.0, epsilon = 1e-12);
    }
}
