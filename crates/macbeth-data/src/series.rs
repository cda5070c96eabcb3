//! Risk factor series.
//!
//! A risk factor is one value per period. Missing periods (typically the
//! leading years a growth rate or a lagged transform cannot cover) are kept
//! as `None` so that downstream estimators can exclude them explicitly.

use serde::{Deserialize, Serialize};

/// Ordered sequence of risk factor observations, one per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorSeries {
    name: String,
    values: Vec<Option<f64>>,
}

impl RiskFactorSeries {
    /// Create a series from optional values. `Some(NaN)` is stored as `None`.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create a series from raw floats, treating NaN as missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use macbeth_data::RiskFactorSeries;
    ///
    /// let series = RiskFactorSeries::from_f64("growth", &[f64::NAN, 0.01, 0.02]);
    /// assert_eq!(series.values(), &[None, Some(0.01), Some(0.02)]);
    /// ```
    pub fn from_f64(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }

    /// Name of the factor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All observations.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no periods.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation at period `t`, `None` if missing or out of range.
    pub fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied().flatten()
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Mean of the observed values, `None` if every value is missing.
    pub fn mean(&self) -> Option<f64> {
        let observed: Vec<f64> = self.values.iter().flatten().copied().collect();
        if observed.is_empty() {
            None
        } else {
            Some(observed.iter().sum::<f64>() / observed.len() as f64)
        }
    }
}
