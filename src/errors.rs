//! Errors
//!
//! Custom error types used throughout the `robust_eda` crate.
use thiserror::Error;

/// Errors that can occur while selecting, analysing or loading data.
#[derive(Debug, Error)]
pub enum EdaError {
    /// The column selector does not match the addressing scheme of the table.
    /// First value is the table kind, second is the selector kind.
    #[error(
        "Invalid input types. Expected a string column name for DataFrame or an integer column index for numpy array. Received {data} for data and {column} for column."
    )]
    InvalidColumnSelector { data: String, column: String },
    /// Side of a robust rule outside of upper, lower and both.
    #[error("Invalid outlier_type {0}. Expected 'upper', 'lower', or 'both'.")]
    InvalidSideParameter(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Named column is not present in the table.
    #[error("Column {0} not found in data.")]
    ColumnNotFound(String),
    /// Column index past the number of columns.
    #[error("Column index {0} is out of bounds for a table with {1} columns.")]
    ColumnIndexOutOfBounds(usize, usize),
    /// Data and declared dimensions disagree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// Not enough observations for a statistic. Needed, then found.
    #[error("At least {0} observations are required, but {1} were provided.")]
    InsufficientData(usize, usize),
    /// Unable to read data or configuration.
    #[error("Unable to read from {0}")]
    UnableToRead(String),
    /// Unable to write data or configuration.
    #[error("Unable to write to {0}")]
    UnableToWrite(String),
    /// Remote dataset could not be fetched.
    #[error("Unable to download dataset: {0}")]
    Download(String),
}
