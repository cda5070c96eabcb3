//! CSV ingestion.
//!
//! Asset return files have a header row, a period label in the first column
//! and one numeric column per asset. Missing cells may be empty or one of the
//! usual markers (`NA`, `NaN`, `nan`, `null`).

use crate::error::{DataError, Result};
use crate::table::AssetReturnTable;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const MISSING_MARKERS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// Parse one numeric cell. Missing markers yield `Ok(None)`; infinite values
/// are rejected.
pub fn parse_cell(raw: &str, row: usize, column: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return Ok(None);
    }
    let parse_error = || DataError::Parse {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    };
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_infinite() => Err(parse_error()),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(parse_error()),
    }
}

/// Raw CSV contents kept as strings, looked up by header name.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading csv table");
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Read CSV data from any reader.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Raw string cells of a column.
    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.index_of(name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| r.get(idx).cloned().unwrap_or_default())
            .collect())
    }

    /// Numeric column with missing cells as `None`.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.index_of(name)?;
        self.numeric_column_at(idx)
    }

    /// Numeric column that must be fully observed.
    pub fn required_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| DataError::Parse {
                    row: row + 1,
                    column: name.to_string(),
                    value: String::new(),
                })
            })
            .collect()
    }

    fn numeric_column_at(&self, idx: usize) -> Result<Vec<Option<f64>>> {
        let name = &self.headers[idx];
        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| parse_cell(r.get(idx).map_or("", String::as_str), row + 1, name))
            .collect()
    }

    /// Interpret the table as an asset return table: first column labels,
    /// every other column an asset.
    pub fn into_asset_returns(self) -> Result<AssetReturnTable> {
        if self.headers.len() < 2 {
            return Err(DataError::EmptyTable(
                "asset return table needs a label column and at least one asset".to_string(),
            ));
        }
        let periods = self
            .rows
            .iter()
            .map(|r| r.first().cloned().unwrap_or_default())
            .collect();
        let columns = (1..self.headers.len())
            .map(|idx| Ok((self.headers[idx].clone(), self.numeric_column_at(idx)?)))
            .collect::<Result<Vec<_>>>()?;
        AssetReturnTable::new(self.headers[0].clone(), periods, columns)
    }
}

/// Read an asset return table from a CSV file.
pub fn read_asset_returns(path: impl AsRef<Path>) -> Result<AssetReturnTable> {
    let table = CsvTable::from_path(path)?.into_asset_returns()?;
    debug!(
        assets = table.n_assets(),
        periods = table.n_periods(),
        "loaded asset returns"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("NA", None)]
    #[case(" NaN ", None)]
    #[case("nan", None)]
    #[case("1.5", Some(1.5))]
    #[case("-2e-2", Some(-0.02))]
    fn test_parse_cell(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_cell(raw, 1, "x").unwrap(), expected);
    }

    #[test]
    fn test_parse_cell_error() {
        let err = parse_cell("abc", 4, "asset").unwrap_err();
        assert!(matches!(err, DataError::Parse { row: 4, .. }));
    }

    #[rstest]
    #[case("inf")]
    #[case("-inf")]
    #[case("Infinity")]
    #[case("1e400")]
    fn test_parse_cell_rejects_infinite(#[case] raw: &str) {
        assert!(matches!(
            parse_cell(raw, 2, "asset"),
            Err(DataError::Parse { row: 2, .. })
        ));
    }

    #[test]
    fn test_csv_table_columns() {
        let data = "year,pop,extra\n2000,100,\n2001,101,3\n";
        let table = CsvTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.required_column("pop").unwrap(), vec![100.0, 101.0]);
        assert_eq!(table.column("extra").unwrap(), vec![None, Some(3.0)]);
        assert!(table.required_column("extra").is_err());
        assert!(matches!(
            table.column("missing"),
            Err(DataError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_into_asset_returns() {
        let data = "year,A,B\n2000,1.0,NaN\n2001,2.0,3.0\n";
        let table = CsvTable::from_reader(data.as_bytes())
            .unwrap()
            .into_asset_returns()
            .unwrap();
        assert_eq!(table.period_label(), "year");
        assert_eq!(table.periods(), &["2000".to_string(), "2001".to_string()]);
        assert_eq!(table.column("B").unwrap(), &[None, Some(3.0)]);
    }

    #[test]
    fn test_label_only_table_rejected() {
        let data = "year\n2000\n";
        let table = CsvTable::from_reader(data.as_bytes()).unwrap();
        assert!(matches!(
            table.into_asset_returns(),
            Err(DataError::EmptyTable(_))
        ));
    }
}
