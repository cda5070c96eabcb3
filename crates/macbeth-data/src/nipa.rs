//! National-accounts consumption factor.
//!
//! Builds the consumption-growth risk factor from NIPA tables:
//!
//! 1. real consumption `c = nondurables / p_nd + services / p_s`
//! 2. per capita `c * 10^6 / (population * 10^3)` (millions of dollars,
//!    thousands of people)
//! 3. filtered growth `g_t = ln(c_t / c_{t-1})`
//! 4. unfiltered log level `y_t = (ln c_t - (1 - Ω) g_{t-1}) / Ω`
//! 5. unfiltered growth `y_t - y_{t-1}`
//!
//! Every step is a single pass over whole columns. Leading periods that a
//! lag cannot cover are `None`.

use crate::error::{DataError, Result};
use crate::reader::CsvTable;
use crate::series::RiskFactorSeries;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default NIPA filter parameter Ω.
pub const DEFAULT_OMEGA: f64 = 0.46;

/// Column names used when reading the national-accounts CSV files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NipaColumns {
    /// Year column, present in the consumption and population files
    pub year: String,
    /// Nominal nondurables consumption (millions)
    pub nondurables: String,
    /// Nominal services consumption (millions)
    pub services: String,
    /// Population (thousands)
    pub population: String,
    /// Price index for nondurables
    pub price_nondurables: String,
    /// Price index for services
    pub price_services: String,
}

impl Default for NipaColumns {
    fn default() -> Self {
        Self {
            year: "year".to_string(),
            nondurables: "nondurables".to_string(),
            services: "services".to_string(),
            population: "pop".to_string(),
            price_nondurables: "prc_index_nondurables".to_string(),
            price_services: "prc_index_services".to_string(),
        }
    }
}

/// Yearly national-accounts inputs, aligned by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalAccounts {
    years: Vec<i64>,
    nondurables: Vec<f64>,
    services: Vec<f64>,
    price_nondurables: Vec<f64>,
    price_services: Vec<f64>,
    population: Vec<f64>,
}

impl NationalAccounts {
    /// Bundle the input columns. All columns must have one entry per year.
    pub fn new(
        years: Vec<i64>,
        nondurables: Vec<f64>,
        services: Vec<f64>,
        price_nondurables: Vec<f64>,
        price_services: Vec<f64>,
        population: Vec<f64>,
    ) -> Result<Self> {
        let expected = years.len();
        for (name, len) in [
            ("nondurables", nondurables.len()),
            ("services", services.len()),
            ("price_nondurables", price_nondurables.len()),
            ("price_services", price_services.len()),
            ("population", population.len()),
        ] {
            if len != expected {
                return Err(DataError::RaggedColumns {
                    column: name.to_string(),
                    expected,
                    actual: len,
                });
            }
        }
        Ok(Self {
            years,
            nondurables,
            services,
            price_nondurables,
            price_services,
            population,
        })
    }

    /// Load the three NIPA files: consumption (year, nondurables, services),
    /// population (year, pop) and price indices.
    ///
    /// # Errors
    ///
    /// [`DataError::YearMismatch`] when the consumption and population files
    /// do not cover the same years row by row.
    pub fn from_csv(
        consumption: impl AsRef<Path>,
        population: impl AsRef<Path>,
        price_index: impl AsRef<Path>,
        columns: &NipaColumns,
    ) -> Result<Self> {
        let consumption = CsvTable::from_path(consumption)?;
        let population = CsvTable::from_path(population)?;
        let prices = CsvTable::from_path(price_index)?;

        let years = parse_years(&consumption, &columns.year)?;
        let pop_years = parse_years(&population, &columns.year)?;
        if let Some((row, (&left, &right))) = years
            .iter()
            .zip(&pop_years)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(DataError::YearMismatch { row, left, right });
        }
        if years.len() != pop_years.len() {
            return Err(DataError::RaggedColumns {
                column: columns.population.clone(),
                expected: years.len(),
                actual: pop_years.len(),
            });
        }

        Self::new(
            years,
            consumption.required_column(&columns.nondurables)?,
            consumption.required_column(&columns.services)?,
            prices.required_column(&columns.price_nondurables)?,
            prices.required_column(&columns.price_services)?,
            population.required_column(&columns.population)?,
        )
    }

    /// Years covered, one per row.
    pub fn years(&self) -> &[i64] {
        &self.years
    }

    /// Price-adjusted total consumption.
    pub fn real_consumption(&self) -> Vec<f64> {
        self.nondurables
            .iter()
            .zip(&self.price_nondurables)
            .zip(self.services.iter().zip(&self.price_services))
            .map(|((nd, p_nd), (s, p_s))| nd / p_nd + s / p_s)
            .collect()
    }

    /// Real consumption per capita.
    pub fn consumption_per_capita(&self) -> Vec<f64> {
        self.real_consumption()
            .iter()
            .zip(&self.population)
            .map(|(c, pop)| c * 1e6 / (pop * 1e3))
            .collect()
    }

    /// Derive filtered and unfiltered consumption growth.
    pub fn factors(&self, omega: f64) -> Result<ConsumptionFactors> {
        validate_omega(omega)?;
        let per_capita = self.consumption_per_capita();
        let filtered = filtered_growth(&per_capita);
        let unfiltered_level = unfiltered_log_level(&per_capita, &filtered, omega);
        let unfiltered = first_difference(&unfiltered_level);
        debug!(
            years = self.years.len(),
            omega, "derived consumption growth factors"
        );
        Ok(ConsumptionFactors {
            years: self.years.clone(),
            per_capita,
            filtered: RiskFactorSeries::new("filtered_growth_rate", filtered),
            unfiltered_level,
            unfiltered: RiskFactorSeries::new("unfiltered_growth_rate", unfiltered),
            omega,
        })
    }
}

fn parse_years(table: &CsvTable, column: &str) -> Result<Vec<i64>> {
    table
        .text_column(column)?
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            raw.trim().parse::<i64>().map_err(|_| DataError::Parse {
                row: row + 1,
                column: column.to_string(),
                value: raw.clone(),
            })
        })
        .collect()
}

fn validate_omega(omega: f64) -> Result<()> {
    if omega > 0.0 && omega <= 1.0 {
        Ok(())
    } else {
        Err(DataError::InvalidParameter(format!(
            "omega must lie in (0, 1], got {omega}"
        )))
    }
}

/// Log growth `ln(c_t / c_{t-1})`; the first period has no growth rate.
pub fn filtered_growth(per_capita: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(per_capita.windows(2).map(|w| Some((w[1] / w[0]).ln())))
        .take(per_capita.len())
        .collect()
}

/// Unfiltered log consumption level `(ln c_t - (1 - Ω) g_{t-1}) / Ω`.
pub fn unfiltered_log_level(
    per_capita: &[f64],
    filtered: &[Option<f64>],
    omega: f64,
) -> Vec<Option<f64>> {
    let lagged = std::iter::once(None).chain(filtered.iter().copied());
    per_capita
        .iter()
        .zip(lagged)
        .map(|(c, g_prev)| g_prev.map(|g| (c.ln() - (1.0 - omega) * g) / omega))
        .collect()
}

/// First difference of a series with missing values.
pub fn first_difference(level: &[Option<f64>]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(level.windows(2).map(|w| match (w[0], w[1]) {
            (Some(prev), Some(cur)) => Some(cur - prev),
            _ => None,
        }))
        .take(level.len())
        .collect()
}

/// Consumption growth factors derived from [`NationalAccounts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionFactors {
    /// Years, one per row
    pub years: Vec<i64>,
    /// Real consumption per capita
    pub per_capita: Vec<f64>,
    /// Filtered (published) consumption growth
    pub filtered: RiskFactorSeries,
    /// Unfiltered log consumption level
    pub unfiltered_level: Vec<Option<f64>>,
    /// Unfiltered consumption growth
    pub unfiltered: RiskFactorSeries,
    /// Filter parameter used
    pub omega: f64,
}

impl ConsumptionFactors {
    /// Average filtered growth rate, ignoring missing years.
    pub fn mean_filtered_growth(&self) -> Option<f64> {
        self.filtered.mean()
    }

    /// Text table of the first `rows` years: year, filtered and unfiltered growth.
    pub fn head_table(&self, rows: usize) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |x| format!("{x:.6}"));
        let mut out = format!(
            "{:>6} {:>22} {:>22}\n",
            "year", "filtered_growth_rate", "unfiltered_growth_rate"
        );
        for (t, year) in self.years.iter().enumerate().take(rows) {
            out.push_str(&format!(
                "{:>6} {:>22} {:>22}\n",
                year,
                fmt(self.filtered.get(t)),
                fmt(self.unfiltered.get(t))
            ));
        }
        out
    }
}
