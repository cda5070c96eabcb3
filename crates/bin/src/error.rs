//! CLI error type.

use macbeth_data::DataError;
use macbeth_estimation::EstimationError;
use macbeth_output::{ExportError, ReportError};
use thiserror::Error;

/// Errors surfaced by the `macbeth` binary.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Reading or building inputs failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Estimation failed
    #[error("Estimation error: {0}")]
    Estimation(#[from] EstimationError),

    /// Writing result tables failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Writing the report failed
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Config file could not be parsed
    #[error("Invalid config {path}: {source}")]
    Config {
        /// Config file path
        path: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Subscriber could not be installed
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
