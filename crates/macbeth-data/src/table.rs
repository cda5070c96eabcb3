//! Asset return table.
//!
//! Rows are periods, columns are assets. The leading period label column
//! (year or date) is kept apart from the numeric columns so it can never end
//! up in a regression.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier of a test asset (the column header of its return series).
pub type AssetId = String;

/// Per-asset return series sharing a common period index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturnTable {
    period_label: String,
    periods: Vec<String>,
    assets: Vec<AssetId>,
    columns: Vec<Vec<Option<f64>>>,
}

impl AssetReturnTable {
    /// Build a table from period labels and `(asset, returns)` columns.
    ///
    /// `Some(NaN)` is stored as a missing value.
    ///
    /// # Errors
    ///
    /// Fails with [`DataError::RaggedColumns`] if a column length differs from
    /// the number of periods and [`DataError::DuplicateAsset`] if an asset
    /// identifier appears twice.
    pub fn new(
        period_label: impl Into<String>,
        periods: Vec<String>,
        columns: Vec<(AssetId, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let n_periods = periods.len();
        let mut seen = HashSet::with_capacity(columns.len());
        let mut assets = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());

        for (asset, column) in columns {
            if column.len() != n_periods {
                return Err(DataError::RaggedColumns {
                    column: asset,
                    expected: n_periods,
                    actual: column.len(),
                });
            }
            if !seen.insert(asset.clone()) {
                return Err(DataError::DuplicateAsset(asset));
            }
            assets.push(asset);
            values.push(
                column
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect(),
            );
        }

        Ok(Self {
            period_label: period_label.into(),
            periods,
            assets,
            columns: values,
        })
    }

    /// Header of the period label column.
    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    /// Period labels, one per row.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Asset identifiers in column order.
    pub fn asset_ids(&self) -> &[AssetId] {
        &self.assets
    }

    /// Number of periods (rows).
    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    /// Number of asset columns.
    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Whether an asset column exists.
    pub fn contains(&self, asset: &str) -> bool {
        self.position(asset).is_some()
    }

    fn position(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Return series of one asset.
    pub fn column(&self, asset: &str) -> Option<&[Option<f64>]> {
        self.position(asset).map(|i| self.columns[i].as_slice())
    }

    /// Iterate over `(asset, returns)` in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.assets
            .iter()
            .zip(&self.columns)
            .map(|(a, c)| (a.as_str(), c.as_slice()))
    }

    /// Copy of the table with the given assets removed. Unknown identifiers
    /// are ignored.
    pub fn without_assets<S: AsRef<str>>(&self, removed: &[S]) -> Self {
        let removed: HashSet<&str> = removed.iter().map(AsRef::as_ref).collect();
        let (assets, columns) = self
            .assets
            .iter()
            .zip(&self.columns)
            .filter(|(a, _)| !removed.contains(a.as_str()))
            .map(|(a, c)| (a.clone(), c.clone()))
            .unzip();
        Self {
            period_label: self.period_label.clone(),
            periods: self.periods.clone(),
            assets,
            columns,
        }
    }

    /// Copy of the table without its first `start` periods.
    pub fn tail(&self, start: usize) -> Self {
        let start = start.min(self.n_periods());
        Self {
            period_label: self.period_label.clone(),
            periods: self.periods[start..].to_vec(),
            assets: self.assets.clone(),
            columns: self.columns.iter().map(|c| c[start..].to_vec()).collect(),
        }
    }

    /// Mean return of one asset over its observed periods.
    pub fn average_return(&self, asset: &str) -> Option<f64> {
        let column = self.column(asset)?;
        let observed: Vec<f64> = column.iter().flatten().copied().collect();
        if observed.is_empty() {
            None
        } else {
            Some(observed.iter().sum::<f64>() / observed.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> AssetReturnTable {
        AssetReturnTable::new(
            "year",
            vec!["2000".into(), "2001".into(), "2002".into()],
            vec![
                ("a".into(), vec![Some(1.0), Some(2.0), Some(3.0)]),
                ("b".into(), vec![Some(4.0), None, Some(f64::NAN)]),
                ("c".into(), vec![Some(0.5), Some(0.5), Some(0.5)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_construction() {
        let table = sample();
        assert_eq!(table.n_periods(), 3);
        assert_eq!(table.n_assets(), 3);
        assert_eq!(table.period_label(), "year");
        assert_eq!(table.column("b").unwrap(), &[Some(4.0), None, None]);
        assert!(table.column("zz").is_none());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = AssetReturnTable::new(
            "year",
            vec!["2000".into(), "2001".into()],
            vec![("a".into(), vec![Some(1.0)])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::RaggedColumns {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let err = AssetReturnTable::new(
            "year",
            vec!["2000".into()],
            vec![("a".into(), vec![Some(1.0)]), ("a".into(), vec![Some(2.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::DuplicateAsset(ref a) if a == "a"));
    }

    #[test]
    fn test_without_assets_leaves_original() {
        let table = sample();
        let pruned = table.without_assets(&["a", "unknown"]);
        assert_eq!(pruned.asset_ids(), &["b".to_string(), "c".to_string()]);
        assert_eq!(table.n_assets(), 3);
    }

    #[test]
    fn test_tail() {
        let table = sample();
        let tail = table.tail(1);
        assert_eq!(tail.periods(), &["2001".to_string(), "2002".to_string()]);
        assert_eq!(tail.column("a").unwrap(), &[Some(2.0), Some(3.0)]);
        assert_eq!(table.tail(10).n_periods(), 0);
    }

    #[test]
    fn test_average_return_skips_missing() {
        let table = sample();
        assert_abs_diff_eq!(table.average_return("a").unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.average_return("b").unwrap(), 4.0, epsilon = 1e-12);
        assert!(table.average_return("zz").is_none());
    }
}
