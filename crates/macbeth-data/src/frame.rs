//! Conversion from polars DataFrames.

use crate::error::{DataError, Result};
use crate::table::AssetReturnTable;
use polars::prelude::*;

impl AssetReturnTable {
    /// Build a table from a DataFrame whose first column holds period labels
    /// and whose remaining columns hold returns. Nulls and NaN become missing
    /// values; integer return columns are cast to `f64`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df.get_columns();
        let Some((label, assets)) = columns.split_first() else {
            return Err(DataError::EmptyTable("dataframe has no columns".to_string()));
        };
        if assets.is_empty() {
            return Err(DataError::EmptyTable(
                "dataframe has no asset columns".to_string(),
            ));
        }

        let labels = label.as_materialized_series().cast(&DataType::String)?;
        let periods = labels
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();

        let values = assets
            .iter()
            .map(|column| {
                let series = column.as_materialized_series().cast(&DataType::Float64)?;
                let returns: Vec<Option<f64>> = series.f64()?.into_iter().collect();
                Ok((column.name().to_string(), returns))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(label.name().to_string(), periods, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dataframe() {
        let df = df!(
            "year" => [2000i64, 2001, 2002],
            "small_value" => [Some(1.5f64), None, Some(2.5)],
            "big_growth" => [0.5f64, f64::NAN, 1.0],
        )
        .unwrap();

        let table = AssetReturnTable::from_dataframe(&df).unwrap();
        assert_eq!(table.period_label(), "year");
        assert_eq!(table.periods()[2], "2002");
        assert_eq!(table.n_assets(), 2);
        assert_eq!(
            table.column("small_value").unwrap(),
            &[Some(1.5), None, Some(2.5)]
        );
        assert_eq!(
            table.column("big_growth").unwrap(),
            &[Some(0.5), None, Some(1.0)]
        );
    }

    #[test]
    fn test_from_dataframe_requires_assets() {
        let df = df!("year" => [2000i64, 2001]).unwrap();
        assert!(matches!(
            AssetReturnTable::from_dataframe(&df),
            Err(DataError::EmptyTable(_))
        ));
    }
}
