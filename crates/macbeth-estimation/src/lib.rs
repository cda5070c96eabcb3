#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/macbeth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod align;
pub mod error;
pub mod ols;
pub mod pipeline;
pub mod prune;
pub mod ransac;
pub mod stage_one;
pub mod stage_two;

// Re-export main types
pub use align::align;
pub use error::{EstimationError, Result};
pub use ols::{LineFit, fit_line};
pub use pipeline::{FactorRun, RobustFitReport, RunReport, Study, StudyConfig, StudyReport};
pub use prune::{PrunedSubset, PruningFrame, prune, prune_sweep};
pub use ransac::{RansacConfig, RobustFit, robust_fit, robust_fit_with_rng};
pub use stage_one::{AlphaBeta, BetaVector, FirstPassEstimates, stage_one};
pub use stage_two::{CrossSectionalEstimate, RiskPremia, stage_two};
