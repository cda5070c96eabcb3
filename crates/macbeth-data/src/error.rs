//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or deriving study inputs.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A cell could not be parsed as a number
    #[error("Data parsing error at row {row}, column '{column}': {value:?}")]
    Parse {
        /// 1-based data row (header excluded)
        row: usize,
        /// Column header
        column: String,
        /// Raw cell contents
        value: String,
    },

    /// Required column not present in a table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Table with no asset columns or no rows
    #[error("Empty table: {0}")]
    EmptyTable(String),

    /// Columns of differing length
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        /// Offending column
        column: String,
        /// Expected row count
        expected: usize,
        /// Actual row count
        actual: usize,
    },

    /// Same asset identifier used twice
    #[error("Duplicate asset identifier: {0}")]
    DuplicateAsset(String),

    /// Year columns of two national-accounts tables disagree
    #[error("Year mismatch at row {row}: {left} vs {right}")]
    YearMismatch {
        /// 0-based row index
        row: usize,
        /// Year in the consumption table
        left: i64,
        /// Year in the other table
        right: i64,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
