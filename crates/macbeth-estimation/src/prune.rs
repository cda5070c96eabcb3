//! Outlier pruning.
//!
//! Extreme betas can drag the cross-sectional line. Pruning at level n drops
//! the n smallest and the n largest betas together with their return columns
//! and re-runs the second pass, so the sensitivity of (lambda, lambda0) to the
//! tails can be read off a sweep over n.
//!
//! Assets are ranked by `(beta, asset id)`. Equal betas are therefore removed
//! in identifier order instead of depending on value lookups.

use crate::error::{EstimationError, Result};
use crate::stage_one::BetaVector;
use crate::stage_two::{RiskPremia, stage_two};
use macbeth_data::{AssetId, AssetReturnTable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Betas and returns with the `2 * level` most extreme assets removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrunedSubset {
    /// Prune level n
    pub level: usize,
    /// Removed assets with the smallest betas, lowest first
    pub removed_low: Vec<AssetId>,
    /// Removed assets with the largest betas, highest first
    pub removed_high: Vec<AssetId>,
    /// Remaining betas
    pub betas: BetaVector,
    /// Remaining returns
    pub assets: AssetReturnTable,
}

impl PrunedSubset {
    /// All removed assets, low tail first.
    pub fn removed(&self) -> impl Iterator<Item = &AssetId> {
        self.removed_low.iter().chain(&self.removed_high)
    }
}

/// One step of a pruning sweep: the pruned data and its second-pass result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningFrame {
    /// Pruned betas and returns
    pub subset: PrunedSubset,
    /// Second pass on the pruned data
    pub premia: RiskPremia,
}

impl PruningFrame {
    /// Prune level of this frame.
    pub const fn level(&self) -> usize {
        self.subset.level
    }
}

/// Remove the `n` smallest and `n` largest betas and their return columns.
///
/// Inputs are left untouched; the subset owns fresh copies. `n = 0` returns
/// the inputs unchanged.
///
/// # Errors
///
/// [`EstimationError::InvalidPruneLevel`] if `2n >= betas.len()`.
pub fn prune(betas: &BetaVector, assets: &AssetReturnTable, n: usize) -> Result<PrunedSubset> {
    let available = betas.len();
    if n > 0 && 2 * n >= available {
        return Err(EstimationError::InvalidPruneLevel {
            level: n,
            available,
        });
    }

    let sorted = betas.sorted_by_beta();
    let removed_low: Vec<AssetId> = sorted.iter().take(n).map(|(a, _)| (*a).clone()).collect();
    let removed_high: Vec<AssetId> = sorted
        .iter()
        .rev()
        .take(n)
        .map(|(a, _)| (*a).clone())
        .collect();

    let removed: Vec<&AssetId> = removed_low.iter().chain(&removed_high).collect();
    debug!(level = n, removed = ?removed, "pruned extreme betas");

    Ok(PrunedSubset {
        level: n,
        betas: betas.without(&removed),
        assets: assets.without_assets(&removed),
        removed_low,
        removed_high,
    })
}

/// Prune independently at every level and run the second pass on each subset.
///
/// Frames come back in the order of `levels`. Levels are evaluated in
/// parallel; the first failing level (in that order) aborts the sweep.
pub fn prune_sweep(
    betas: &BetaVector,
    assets: &AssetReturnTable,
    levels: impl IntoIterator<Item = usize>,
) -> Result<Vec<PruningFrame>> {
    let levels: Vec<usize> = levels.into_iter().collect();
    let frames: Vec<Result<PruningFrame>> = levels
        .par_iter()
        .map(|&n| {
            let subset = prune(betas, assets, n)?;
            let premia = stage_two(&subset.assets, &subset.betas)?;
            Ok(PruningFrame { subset, premia })
        })
        .collect();
    frames.into_iter().collect()
}
