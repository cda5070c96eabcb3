//! Plot-ready data for second-pass results.
//!
//! A scatter of average return against beta per asset, with a fitted line
//! sampled across fixed x-limits. Rendering is left to the consumer; these
//! types only carry the numbers and titles.

use macbeth_data::AssetReturnTable;
use macbeth_estimation::{BetaVector, PruningFrame, RiskPremia, RobustFitReport};
use serde::{Deserialize, Serialize};

/// Axis limits and line sampling for scatter data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Beta axis range; the fitted line spans it
    pub x_limit: (f64, f64),
    /// Average-return axis range
    pub y_limit: (f64, f64),
    /// Points sampled along the fitted line (at least 2)
    pub line_points: usize,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            x_limit: (-100.0, 300.0),
            y_limit: (-2.0, 22.0),
            line_points: 2,
        }
    }
}

impl ScatterConfig {
    fn line(&self, intercept: f64, slope: f64) -> Vec<(f64, f64)> {
        let n = self.line_points.max(2);
        let (lo, hi) = self.x_limit;
        let step = (hi - lo) / (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = if i == n - 1 { hi } else { lo + step * i as f64 };
                (x, intercept + slope * x)
            })
            .collect()
    }
}

/// One asset in a scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Asset identifier
    pub asset: String,
    /// First-pass beta
    pub beta: f64,
    /// Mean return over observed periods
    pub average_return: f64,
    /// RANSAC classification, if any
    pub inlier: Option<bool>,
}

/// Scatter of average returns on betas with a fitted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondPassScatter {
    /// Plot title
    pub title: String,
    /// One point per asset with an average return
    pub points: Vec<ScatterPoint>,
    /// Fitted line sampled across `x_limit`
    pub line: Vec<(f64, f64)>,
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Beta axis range
    pub x_limit: (f64, f64),
    /// Average-return axis range
    pub y_limit: (f64, f64),
}

impl SecondPassScatter {
    /// Scatter for a second pass, titled after the run.
    pub fn from_premia(
        label: &str,
        betas: &BetaVector,
        assets: &AssetReturnTable,
        premia: &RiskPremia,
        config: &ScatterConfig,
    ) -> Self {
        let points = betas
            .iter()
            .filter_map(|(asset, beta)| {
                assets.average_return(asset).map(|average_return| ScatterPoint {
                    asset: asset.clone(),
                    beta,
                    average_return,
                    inlier: None,
                })
            })
            .collect();
        Self::with_line(
            format!("Second-Stage Fama-MacBeth: {label}"),
            points,
            premia.lambda,
            premia.lambda0,
            config,
        )
    }

    /// Scatter of a RANSAC fit with inlier flags.
    pub fn from_robust(robust: &RobustFitReport, config: &ScatterConfig) -> Self {
        let points = robust
            .assets
            .iter()
            .zip(&robust.betas)
            .zip(&robust.average_returns)
            .zip(&robust.fit.inlier_mask)
            .map(|(((asset, &beta), &average_return), &inlier)| ScatterPoint {
                asset: asset.clone(),
                beta,
                average_return,
                inlier: Some(inlier),
            })
            .collect();
        Self::with_line(
            "RANSAC Regression".to_string(),
            points,
            robust.fit.slope,
            robust.fit.intercept,
            config,
        )
    }

    fn with_line(
        title: String,
        points: Vec<ScatterPoint>,
        slope: f64,
        intercept: f64,
        config: &ScatterConfig,
    ) -> Self {
        Self {
            title,
            points,
            line: config.line(intercept, slope),
            slope,
            intercept,
            x_limit: config.x_limit,
            y_limit: config.y_limit,
        }
    }
}

/// One scatter per pruning level, in sweep order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningAnimation {
    /// Animation frames
    pub frames: Vec<SecondPassScatter>,
}

impl PruningAnimation {
    /// Build frames from a pruning sweep.
    pub fn from_frames(frames: &[PruningFrame], config: &ScatterConfig) -> Self {
        let frames = frames
            .iter()
            .map(|frame| {
                let mut scatter = SecondPassScatter::from_premia(
                    "",
                    &frame.subset.betas,
                    &frame.subset.assets,
                    &frame.premia,
                    config,
                );
                scatter.title = frame_title(frame.level());
                scatter
            })
            .collect();
        Self { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the animation has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn frame_title(level: usize) -> String {
    let plural = if level == 1 { "" } else { "s" };
    format!("Pruning {level} Outlier{plural}")
}
