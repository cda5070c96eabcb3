//! Text summaries of a study.
//!
//! [`StudySummary`] condenses a [`StudyReport`] to the numbers a reader
//! compares across runs: the price of risk and intercept, how they move under
//! pruning, and what RANSAC rejects.

use derive_more::Display;
use macbeth_estimation::{RunReport, StudyReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Second pass on one pruned subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrunedPremia {
    /// Prune level n.
    pub level: usize,

    /// Price of risk after pruning.
    pub lambda: f64,

    /// Intercept after pruning.
    pub lambda0: f64,
}

/// Key results of one factor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("{label}: lambda = {lambda:.4}, lambda0 = {lambda0:.4} ({n_assets} assets)")]
pub struct RunSummary {
    /// Factor run label.
    pub label: String,

    /// Assets with a first-pass estimate.
    pub n_assets: usize,

    /// Periods in the second pass.
    pub n_periods: usize,

    /// Price of risk.
    pub lambda: f64,

    /// Cross-sectional intercept.
    pub lambda0: f64,

    /// Pruning sweep.
    pub pruning: Vec<PrunedPremia>,

    /// RANSAC slope.
    pub ransac_slope: f64,

    /// RANSAC intercept.
    pub ransac_intercept: f64,

    /// Assets rejected by RANSAC.
    pub ransac_outliers: Vec<String>,
}

impl RunSummary {
    /// Summarize one run.
    pub fn from_run(run: &RunReport) -> Self {
        Self {
            label: run.label.clone(),
            n_assets: run.first_pass.len(),
            n_periods: run.premia.n_periods(),
            lambda: run.premia.lambda,
            lambda0: run.premia.lambda0,
            pruning: run
                .pruning
                .iter()
                .map(|f| PrunedPremia {
                    level: f.level(),
                    lambda: f.premia.lambda,
                    lambda0: f.premia.lambda0,
                })
                .collect(),
            ransac_slope: run.robust.fit.slope,
            ransac_intercept: run.robust.fit.intercept,
            ransac_outliers: run.robust.outliers().into_iter().cloned().collect(),
        }
    }
}

/// Summary of every run in a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    /// Per-run summaries in study order.
    pub runs: Vec<RunSummary>,
}

impl StudySummary {
    /// Summarize a study report.
    pub fn from_report(report: &StudyReport) -> Self {
        Self {
            runs: report.runs.iter().map(RunSummary::from_run).collect(),
        }
    }

    /// Format as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nFama-MacBeth Results\n");
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>8} {:>8} {:>12} {:>12} {:>10}\n",
            "Run", "Assets", "Periods", "Lambda", "Lambda0", "Outliers"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');
        for run in &self.runs {
            output.push_str(&format!(
                "{:<16} {:>8} {:>8} {:>12.4} {:>12.4} {:>10}\n",
                run.label,
                run.n_assets,
                run.n_periods,
                run.lambda,
                run.lambda0,
                run.ransac_outliers.len()
            ));
        }
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for run in self.runs.iter().filter(|r| !r.pruning.is_empty()) {
            output.push_str(&format!("\nPruning sweep: {}\n", run.label));
            output.push_str(&format!("{:>6} {:>12} {:>12}\n", "Level", "Lambda", "Lambda0"));
            for p in &run.pruning {
                output.push_str(&format!(
                    "{:>6} {:>12.4} {:>12.4}\n",
                    p.level, p.lambda, p.lambda0
                ));
            }
        }

        for run in &self.runs {
            output.push_str(&format!(
                "\nRANSAC {}: slope {:.4}, intercept {:.4}, outliers [{}]\n",
                run.label,
                run.ransac_slope,
                run.ransac_intercept,
                run.ransac_outliers.join(", ")
            ));
        }
        output
    }

    /// Format as markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Fama-MacBeth Results\n\n");
        output.push_str("| Run | Assets | Periods | Lambda | Lambda0 | RANSAC Outliers |\n");
        output.push_str("|-----|--------|---------|--------|---------|-----------------|\n");
        for run in &self.runs {
            output.push_str(&format!(
                "| {} | {} | {} | {:.4} | {:.4} | {} |\n",
                run.label,
                run.n_assets,
                run.n_periods,
                run.lambda,
                run.lambda0,
                run.ransac_outliers.join(", ")
            ));
        }

        for run in self.runs.iter().filter(|r| !r.pruning.is_empty()) {
            output.push_str(&format!("\n## Pruning: {}\n\n", run.label));
            output.push_str("| Level | Lambda | Lambda0 |\n");
            output.push_str("|-------|--------|---------|\n");
            for p in &run.pruning {
                output.push_str(&format!(
                    "| {} | {:.4} | {:.4} |\n",
                    p.level, p.lambda, p.lambda0
                ));
            }
        }
        output
    }
}

impl fmt::Display for StudySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            writeln!(f, "{run}")?;
        }
        Ok(())
    }
}
