//! Error types for Fama-MacBeth estimation.

use macbeth_data::AssetId;
use thiserror::Error;

/// Result type for estimation operations.
pub type Result<T> = std::result::Result<T, EstimationError>;

/// Errors that can occur during estimation
#[derive(Debug, Error)]
pub enum EstimationError {
    /// Factor and asset series differ in length after applying offsets
    #[error("Length mismatch after alignment: factor has {factor_len} periods, asset has {asset_len}")]
    Alignment {
        /// Aligned factor length
        factor_len: usize,
        /// Aligned asset length
        asset_len: usize,
    },

    /// Estimation failed for one asset
    #[error("Asset '{asset}': {source}")]
    Asset {
        /// Asset being estimated
        asset: AssetId,
        /// Underlying failure
        #[source]
        source: Box<EstimationError>,
    },

    /// Betas reference assets absent from the return table
    #[error("Betas reference assets absent from the return table: {missing:?}")]
    KeyMismatch {
        /// Identifiers with no return column
        missing: Vec<AssetId>,
    },

    /// Too few observations to fit a line
    #[error("Insufficient data for {context}: need at least {required}, got {actual}")]
    InsufficientData {
        /// What was being fitted
        context: &'static str,
        /// Required count
        required: usize,
        /// Actual count
        actual: usize,
    },

    /// Pruning would leave fewer than one asset
    #[error("Invalid prune level {level} for {available} assets: pruning must leave at least one asset")]
    InvalidPruneLevel {
        /// Requested level n (2n assets removed)
        level: usize,
        /// Assets available before pruning
        available: usize,
    },

    /// Robust fitter input unusable
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Regressor is constant, so the slope is undefined
    #[error("Regressor has zero variance: {0}")]
    ZeroVariance(&'static str),

    /// No RANSAC trial produced a usable candidate line
    #[error("No consensus after {trials} trials: every sampled pair was degenerate")]
    NoConsensus {
        /// Trials attempted
        trials: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl EstimationError {
    pub(crate) fn for_asset(self, asset: &str) -> Self {
        Self::Asset {
            asset: asset.to_string(),
            source: Box::new(self),
        }
    }
}
