#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/macbeth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod ccapm;

// Re-export main types from sub-crates
pub use macbeth_data as data;
pub use macbeth_estimation as estimation;
pub use macbeth_output as output;

// Re-export the consumption CAPM run layout
pub use ccapm::{CcapmRuns, RunOffsets, factor_runs};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
