#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/macbeth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod scatter;
pub mod summary;

pub use export::{
    AlphaBetaRecord, ExportError, ExportFormat, Exporter, InlierRecord, PremiaRecord,
    PruningFrameRecord, Record, StudyExport,
};
pub use report::{Report, ReportBuilder, ReportError};
pub use scatter::{PruningAnimation, ScatterConfig, ScatterPoint, SecondPassScatter};
pub use summary::{PrunedPremia, RunSummary, StudySummary};
