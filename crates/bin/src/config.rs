//! Study configuration file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command-line flags override the file.

use crate::error::CliError;
use macbeth::CcapmRuns;
use macbeth_data::{DEFAULT_OMEGA, NipaColumns};
use macbeth_estimation::StudyConfig;
use macbeth_output::ScatterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of the `--config` JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// NIPA filter parameter
    pub(crate) omega: f64,
    /// Column names in the national-accounts files
    pub(crate) columns: NipaColumns,
    /// Factor and asset offsets per run
    pub(crate) runs: CcapmRuns,
    /// Estimation settings
    pub(crate) study: StudyConfig,
    /// Plot data settings
    pub(crate) scatter: ScatterConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            omega: DEFAULT_OMEGA,
            columns: NipaColumns::default(),
            runs: CcapmRuns::default(),
            study: StudyConfig::default(),
            scatter: ScatterConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from a JSON file, or defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| CliError::Config {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) omega: Option<f64>,
    pub(crate) max_prune: Option<usize>,
    pub(crate) threshold: Option<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_trials: Option<usize>,
    pub(crate) align_second_pass: bool,
}

impl CliConfig {
    /// Apply command-line overrides.
    pub(crate) fn with_overrides(mut self, o: &Overrides) -> Self {
        if let Some(omega) = o.omega {
            self.omega = omega;
        }
        if let Some(n) = o.max_prune {
            self.study.max_prune_level = n;
        }
        if let Some(threshold) = o.threshold {
            self.study.ransac.residual_threshold = threshold;
        }
        if let Some(seed) = o.seed {
            self.study.ransac.random_seed = seed;
        }
        if let Some(trials) = o.max_trials {
            self.study.ransac.max_trials = trials;
        }
        if o.align_second_pass {
            self.study.align_second_pass = true;
        }
        self
    }
}
