//! End-to-end study over one or more factor runs.
//!
//! Each [`FactorRun`] goes through the first pass, the second pass, a pruning
//! sweep and a RANSAC fit of average returns on betas. Runs share nothing but
//! the input table and the [`StudyConfig`]; there is no accumulated state
//! between them.

use crate::error::Result;
use crate::prune::{PruningFrame, prune_sweep};
use crate::ransac::{RansacConfig, RobustFit, robust_fit};
use crate::stage_one::{BetaVector, FirstPassEstimates, stage_one};
use crate::stage_two::{RiskPremia, stage_two};
use macbeth_data::{AssetId, AssetReturnTable, RiskFactorSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

/// Study-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Highest prune level in the sweep (levels `1..=max_prune_level`)
    pub max_prune_level: usize,
    /// RANSAC settings for the robust fit
    pub ransac: RansacConfig,
    /// Run the second pass only on periods from the asset offset onward
    pub align_second_pass: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            max_prune_level: 3,
            ransac: RansacConfig::default(),
            align_second_pass: false,
        }
    }
}

/// A risk factor together with the offsets aligning it to the return table.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRun {
    /// Label used in reports
    pub label: String,
    /// Risk factor series
    pub factor: RiskFactorSeries,
    /// Leading factor periods to drop
    pub factor_offset: usize,
    /// Leading asset periods to drop
    pub asset_offset: usize,
}

impl FactorRun {
    /// Create a new run.
    pub fn new(
        label: impl Into<String>,
        factor: RiskFactorSeries,
        factor_offset: usize,
        asset_offset: usize,
    ) -> Self {
        Self {
            label: label.into(),
            factor,
            factor_offset,
            asset_offset,
        }
    }
}

/// RANSAC fit of average return on beta across assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustFitReport {
    /// Assets entering the fit, in identifier order
    pub assets: Vec<AssetId>,
    /// Beta of each asset
    pub betas: Vec<f64>,
    /// Average return of each asset
    pub average_returns: Vec<f64>,
    /// Fitted line and inlier mask
    pub fit: RobustFit,
}

impl RobustFitReport {
    /// Assets in the consensus set.
    pub fn inliers(&self) -> Vec<&AssetId> {
        self.partition(true)
    }

    /// Assets rejected as outliers.
    pub fn outliers(&self) -> Vec<&AssetId> {
        self.partition(false)
    }

    fn partition(&self, inlier: bool) -> Vec<&AssetId> {
        self.assets
            .iter()
            .zip(&self.fit.inlier_mask)
            .filter(|(_, m)| **m == inlier)
            .map(|(a, _)| a)
            .collect()
    }
}

/// Results for one factor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run label
    pub label: String,
    /// First-pass estimates
    pub first_pass: FirstPassEstimates,
    /// Second pass on all estimated assets
    pub premia: RiskPremia,
    /// Pruning sweep, one frame per level in increasing order
    pub pruning: Vec<PruningFrame>,
    /// Robust fit of average returns on betas
    pub robust: RobustFitReport,
}

impl RunReport {
    /// Betas of the run.
    pub fn betas(&self) -> BetaVector {
        self.first_pass.betas()
    }
}

/// Results for all runs, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    /// Configuration the study ran with
    pub config: StudyConfig,
    /// Per-run results
    pub runs: Vec<RunReport>,
}

impl StudyReport {
    /// Report of the run with the given label.
    pub fn run(&self, label: &str) -> Option<&RunReport> {
        self.runs.iter().find(|r| r.label == label)
    }
}

/// Study driver.
#[derive(Debug, Clone, Default)]
pub struct Study {
    config: StudyConfig,
}

impl Study {
    /// Create a study with the given configuration.
    pub const fn new(config: StudyConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Run every factor run against `assets`. The first failing run aborts.
    pub fn run(&self, assets: &AssetReturnTable, runs: &[FactorRun]) -> Result<StudyReport> {
        let runs = runs
            .iter()
            .map(|run| self.run_one(assets, run))
            .collect::<Result<Vec<_>>>()?;
        Ok(StudyReport {
            config: self.config.clone(),
            runs,
        })
    }

    /// Run a single factor run.
    pub fn run_one(&self, assets: &AssetReturnTable, run: &FactorRun) -> Result<RunReport> {
        let span = info_span!("factor_run", label = %run.label);
        let _enter = span.enter();

        let first_pass = stage_one(&run.factor, assets, run.asset_offset, run.factor_offset)?;
        let betas = first_pass.betas();

        let second_pass_assets = if self.config.align_second_pass {
            assets.tail(run.asset_offset)
        } else {
            assets.clone()
        };
        let premia = stage_two(&second_pass_assets, &betas)?;

        let max_level = self.prune_limit(betas.len());
        let pruning = prune_sweep(&betas, &second_pass_assets, 1..=max_level)?;

        let robust = robust_report(&betas, assets, &self.config.ransac)?;
        info!(
            assets = betas.len(),
            lambda = premia.lambda,
            lambda0 = premia.lambda0,
            prune_levels = pruning.len(),
            ransac_outliers = robust.outliers().len(),
            "factor run complete"
        );

        Ok(RunReport {
            label: run.label.clone(),
            first_pass,
            premia,
            pruning,
            robust,
        })
    }

    /// Highest prune level that still leaves two assets for the second pass.
    fn prune_limit(&self, n_assets: usize) -> usize {
        let limit = n_assets.saturating_sub(2) / 2;
        if self.config.max_prune_level > limit {
            warn!(
                requested = self.config.max_prune_level,
                limit, n_assets, "prune levels capped by number of assets"
            );
        }
        self.config.max_prune_level.min(limit)
    }
}

fn robust_report(
    betas: &BetaVector,
    assets: &AssetReturnTable,
    config: &RansacConfig,
) -> Result<RobustFitReport> {
    let mut ids = Vec::with_capacity(betas.len());
    let mut xs = Vec::with_capacity(betas.len());
    let mut ys = Vec::with_capacity(betas.len());
    for (asset, beta) in betas.iter() {
        match assets.average_return(asset) {
            Some(avg) => {
                ids.push(asset.clone());
                xs.push(beta);
                ys.push(avg);
            }
            None => debug!(asset = %asset, "no returns to average, left out of robust fit"),
        }
    }
    let fit = robust_fit(&xs, &ys, config)?;
    Ok(RobustFitReport {
        assets: ids,
        betas: xs,
        average_returns: ys,
        fit,
    })
}
