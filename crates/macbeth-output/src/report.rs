//! JSON report of a whole study.
//!
//! A [`Report`] bundles the full [`StudyReport`], its [`StudySummary`] and,
//! when the factors came from national accounts, the consumption factors they
//! were built from. It is written as one pretty-printed JSON document and can
//! be read back for later comparison.

use crate::summary::StudySummary;
use chrono::{DateTime, Utc};
use macbeth_data::ConsumptionFactors;
use macbeth_estimation::StudyReport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing or reading a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A timestamped study report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Study name.
    pub name: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Version of the crate that produced the report.
    pub version: String,

    /// NIPA filter parameter of the factors, if they came from national accounts.
    pub omega: Option<f64>,

    /// Consumption factors the runs were built from.
    pub factors: Option<ConsumptionFactors>,

    /// Headline numbers per run.
    pub summary: StudySummary,

    /// Full estimation results.
    pub study: StudyReport,
}

impl Report {
    /// Pretty JSON text of the report.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON report to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a report written by [`Report::write`].
    pub fn read(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Builder for [`Report`].
#[derive(Debug)]
pub struct ReportBuilder<'a> {
    study: &'a StudyReport,
    name: Option<String>,
    factors: Option<&'a ConsumptionFactors>,
}

impl<'a> ReportBuilder<'a> {
    /// Start a report of `study`.
    pub const fn new(study: &'a StudyReport) -> Self {
        Self {
            study,
            name: None,
            factors: None,
        }
    }

    /// Set the study name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the consumption factors; their omega is recorded as well.
    pub const fn factors(mut self, factors: &'a ConsumptionFactors) -> Self {
        self.factors = Some(factors);
        self
    }

    /// Build the report, stamped with the current time.
    pub fn build(self) -> Report {
        Report {
            name: self.name.unwrap_or_else(|| "macbeth".to_string()),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            omega: self.factors.map(|f| f.omega),
            factors: self.factors.cloned(),
            summary: StudySummary::from_report(self.study),
            study: self.study.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macbeth_estimation::StudyConfig;

    fn empty_study() -> StudyReport {
        StudyReport {
            config: StudyConfig::default(),
            runs: Vec::new(),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let study = empty_study();
        let report = ReportBuilder::new(&study).build();
        assert_eq!(report.name, "macbeth");
        assert!(report.omega.is_none());
        assert!(report.factors.is_none());
        assert!(report.summary.runs.is_empty());
        assert!(!report.version.is_empty());
    }

    #[test]
    fn test_json_fields() {
        let study = empty_study();
        let report = ReportBuilder::new(&study).name("ccapm").build();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "ccapm");
        assert!(json["timestamp"].is_string());
        assert_eq!(json["study"]["config"]["max_prune_level"], 3);
    }

    #[test]
    fn test_write_and_read_back() {
        let study = empty_study();
        let report = ReportBuilder::new(&study).name("ccapm").build();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write(&path).unwrap();
        assert_eq!(Report::read(&path).unwrap(), report);
    }
}
