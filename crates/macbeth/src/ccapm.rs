//! Consumption CAPM run layout.
//!
//! The study estimates the same return table against two consumption factors.
//! Filtered growth loses its first year to the log difference; unfiltered
//! growth loses two more to the lagged recurrence and the differencing of its
//! level. The asset side is trimmed further so both windows start in the same
//! calendar year as the published return series.

use macbeth_data::ConsumptionFactors;
use macbeth_estimation::FactorRun;
use serde::{Deserialize, Serialize};

/// Leading periods dropped from the factor and from the asset returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOffsets {
    /// Factor periods to drop
    pub factor_offset: usize,
    /// Asset periods to drop
    pub asset_offset: usize,
}

/// Offsets for the filtered and unfiltered runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcapmRuns {
    /// Filtered consumption growth
    pub filtered: RunOffsets,
    /// Unfiltered consumption growth
    pub unfiltered: RunOffsets,
}

impl Default for CcapmRuns {
    fn default() -> Self {
        Self {
            filtered: RunOffsets {
                factor_offset: 1,
                asset_offset: 3,
            },
            unfiltered: RunOffsets {
                factor_offset: 3,
                asset_offset: 5,
            },
        }
    }
}

/// Build the filtered and unfiltered runs, in that order.
pub fn factor_runs(factors: &ConsumptionFactors, layout: &CcapmRuns) -> Vec<FactorRun> {
    [
        ("filtered", &factors.filtered, layout.filtered),
        ("unfiltered", &factors.unfiltered, layout.unfiltered),
    ]
    .into_iter()
    .map(|(label, series, offsets)| {
        FactorRun::new(
            label,
            series.clone(),
            offsets.factor_offset,
            offsets.asset_offset,
        )
    })
    .collect()
}
