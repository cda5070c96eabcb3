#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/macbeth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod nipa;
pub mod reader;
pub mod series;
pub mod table;

pub use error::{DataError, Result};
pub use nipa::{ConsumptionFactors, DEFAULT_OMEGA, NationalAccounts, NipaColumns};
pub use reader::{CsvTable, read_asset_returns};
pub use series::RiskFactorSeries;
pub use table::{AssetId, AssetReturnTable};
