//! Export of study results.
//!
//! Every result table is a flat record type so the same rows can be written
//! as CSV or JSON. [`StudyExport`] collects the tables of a whole
//! [`StudyReport`] and writes one file per table.

use derive_more::Display;
use macbeth_estimation::{FirstPassEstimates, PruningFrame, RunReport, StudyReport};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("Invalid UTF-8 in CSV output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[display("csv")]
    Csv,

    /// Compact JSON format.
    #[display("json")]
    Json,

    /// Pretty-printed JSON format.
    #[display("pretty-json")]
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// First-pass estimate of one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlphaBetaRecord {
    /// Factor run label.
    pub run: String,

    /// Asset identifier.
    pub asset: String,

    /// Time-series intercept.
    pub alpha: f64,

    /// Factor exposure.
    pub beta: f64,

    /// Periods in the regression.
    pub n_obs: usize,
}

impl AlphaBetaRecord {
    /// One record per estimated asset, in identifier order.
    pub fn from_first_pass(run: &str, estimates: &FirstPassEstimates) -> Vec<Self> {
        estimates
            .iter()
            .map(|(asset, e)| Self {
                run: run.to_string(),
                asset: asset.clone(),
                alpha: e.alpha,
                beta: e.beta,
                n_obs: e.n_obs,
            })
            .collect()
    }
}

/// Second-pass result of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PremiaRecord {
    /// Factor run label.
    pub run: String,

    /// Price of risk.
    pub lambda: f64,

    /// Cross-sectional intercept.
    pub lambda0: f64,

    /// Assets in the cross-section.
    pub n_assets: usize,

    /// Periods averaged.
    pub n_periods: usize,

    /// Periods skipped for missing returns.
    pub n_skipped: usize,
}

impl PremiaRecord {
    /// Record for the unpruned second pass of a run.
    pub fn from_run(run: &RunReport) -> Self {
        Self {
            run: run.label.clone(),
            lambda: run.premia.lambda,
            lambda0: run.premia.lambda0,
            n_assets: run.first_pass.len(),
            n_periods: run.premia.n_periods(),
            n_skipped: run.premia.skipped.len(),
        }
    }
}

/// One level of a pruning sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PruningFrameRecord {
    /// Factor run label.
    pub run: String,

    /// Prune level n.
    pub level: usize,

    /// Assets left after pruning.
    pub n_assets: usize,

    /// Removed low-beta assets, `;`-separated.
    pub removed_low: String,

    /// Removed high-beta assets, `;`-separated.
    pub removed_high: String,

    /// Price of risk on the pruned set.
    pub lambda: f64,

    /// Intercept on the pruned set.
    pub lambda0: f64,
}

impl PruningFrameRecord {
    /// Record for one pruning frame.
    pub fn from_frame(run: &str, frame: &PruningFrame) -> Self {
        Self {
            run: run.to_string(),
            level: frame.level(),
            n_assets: frame.subset.betas.len(),
            removed_low: frame.subset.removed_low.join(";"),
            removed_high: frame.subset.removed_high.join(";"),
            lambda: frame.premia.lambda,
            lambda0: frame.premia.lambda0,
        }
    }
}

/// RANSAC classification of one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlierRecord {
    /// Factor run label.
    pub run: String,

    /// Asset identifier.
    pub asset: String,

    /// Factor exposure.
    pub beta: f64,

    /// Mean return over observed periods.
    pub average_return: f64,

    /// Whether the asset is in the consensus set.
    pub inlier: bool,
}

impl InlierRecord {
    /// One record per asset in the robust fit of a run.
    pub fn from_run(run: &RunReport) -> Vec<Self> {
        let robust = &run.robust;
        robust
            .assets
            .iter()
            .zip(&robust.betas)
            .zip(&robust.average_returns)
            .zip(&robust.fit.inlier_mask)
            .map(|(((asset, &beta), &average_return), &inlier)| Self {
                run: run.label.clone(),
                asset: asset.clone(),
                beta,
                average_return,
                inlier,
            })
            .collect()
    }
}

/// Flat record types that can be written as a table.
pub trait Record: Serialize {}

impl Record for AlphaBetaRecord {}
impl Record for PremiaRecord {}
impl Record for PruningFrameRecord {}
impl Record for InlierRecord {}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl<R: Record> Exporter for [R] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self {
                    wtr.serialize(record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// All result tables of a study.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudyExport {
    /// First-pass estimates of every run.
    pub first_pass: Vec<AlphaBetaRecord>,

    /// Second-pass result of every run.
    pub premia: Vec<PremiaRecord>,

    /// Pruning sweeps of every run.
    pub pruning: Vec<PruningFrameRecord>,

    /// RANSAC classification of every run.
    pub ransac: Vec<InlierRecord>,
}

impl StudyExport {
    /// Flatten a study report.
    pub fn from_report(report: &StudyReport) -> Self {
        let mut export = Self::default();
        for run in &report.runs {
            export
                .first_pass
                .extend(AlphaBetaRecord::from_first_pass(&run.label, &run.first_pass));
            export.premia.push(PremiaRecord::from_run(run));
            export.pruning.extend(
                run.pruning
                    .iter()
                    .map(|f| PruningFrameRecord::from_frame(&run.label, f)),
            );
            export.ransac.extend(InlierRecord::from_run(run));
        }
        export
    }

    /// Write one file per table into `dir`, named after the table.
    ///
    /// Returns the written paths in table order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a table fails
    /// to serialize or write.
    pub fn write_all(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;
        let ext = format.extension();
        let path = |name: &str| dir.join(format!("{name}.{ext}"));

        let written = vec![
            write_table(&self.first_pass, path("first_pass"), format)?,
            write_table(&self.premia, path("premia"), format)?,
            write_table(&self.pruning, path("pruning"), format)?,
            write_table(&self.ransac, path("ransac"), format)?,
        ];
        info!(dir = %dir.display(), %format, files = written.len(), "exported study results");
        Ok(written)
    }
}

fn write_table<R: Record>(
    records: &[R],
    path: PathBuf,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    records.export_to_file(&path, format)?;
    Ok(path)
}
