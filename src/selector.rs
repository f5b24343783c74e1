//! Selector
//!
//! Resolution of a table plus a column selector into a plain numeric sample.
//! Labeled tables are addressed by name, unlabeled arrays by position, and a
//! selector of the wrong kind for the table is rejected before any value is read.
use crate::data::{DataFrame, Matrix};
use crate::errors::EdaError;
use serde::{Deserialize, Serialize};

/// Which column(s) of a table to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSelector {
    /// A named column of a labeled table.
    ByName(String),
    /// A positional column of an unlabeled array.
    ByIndex(usize),
    /// Every value of the table.
    All,
}

impl ColumnSelector {
    /// Name of the selector kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnSelector::ByName(_) => "str",
            ColumnSelector::ByIndex(_) => "int",
            ColumnSelector::All => "None",
        }
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::ByName(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::ByName(name)
    }
}

impl From<usize> for ColumnSelector {
    fn from(index: usize) -> Self {
        ColumnSelector::ByIndex(index)
    }
}

impl<T: Into<ColumnSelector>> From<Option<T>> for ColumnSelector {
    fn from(selector: Option<T>) -> Self {
        selector.map_or(ColumnSelector::All, Into::into)
    }
}

/// A table that can hand out one numeric sample per selector.
pub trait Table {
    /// Name of the table kind, used in error messages.
    fn kind(&self) -> &'static str;
    /// Column names, positional tables name their columns by index.
    fn columns(&self) -> Vec<String>;
    /// Values addressed by the selector.
    fn values_of(&self, selector: &ColumnSelector) -> Result<Vec<f64>, EdaError>;
}

fn invalid_selector<T: Table + ?Sized>(table: &T, selector: &ColumnSelector) -> EdaError {
    EdaError::InvalidColumnSelector {
        data: table.kind().to_string(),
        column: selector.kind().to_string(),
    }
}

impl Table for DataFrame {
    fn kind(&self) -> &'static str {
        "DataFrame"
    }

    fn columns(&self) -> Vec<String> {
        DataFrame::columns(self).to_vec()
    }

    fn values_of(&self, selector: &ColumnSelector) -> Result<Vec<f64>, EdaError> {
        match selector {
            ColumnSelector::ByName(name) => Ok(self.column(name)?.to_vec()),
            ColumnSelector::All => Ok(self.flatten_row_major()),
            ColumnSelector::ByIndex(_) => Err(invalid_selector(self, selector)),
        }
    }
}

impl<'a> Table for Matrix<'a, f64> {
    fn kind(&self) -> &'static str {
        "Matrix"
    }

    fn columns(&self) -> Vec<String> {
        (0..self.cols).map(|j| j.to_string()).collect()
    }

    fn values_of(&self, selector: &ColumnSelector) -> Result<Vec<f64>, EdaError> {
        // `Matrix::new` does not check its data length.
        Matrix::try_new(self.data, self.rows, self.cols)?;
        match selector {
            ColumnSelector::ByIndex(j) if *j < self.cols => Ok(self.get_col(*j).to_vec()),
            ColumnSelector::ByIndex(j) => Err(EdaError::ColumnIndexOutOfBounds(*j, self.cols)),
            ColumnSelector::All => Ok(self.data.to_vec()),
            ColumnSelector::ByName(_) => Err(invalid_selector(self, selector)),
        }
    }
}

impl Table for [f64] {
    fn kind(&self) -> &'static str {
        "ndarray"
    }

    fn columns(&self) -> Vec<String> {
        vec!["0".to_string()]
    }

    fn values_of(&self, selector: &ColumnSelector) -> Result<Vec<f64>, EdaError> {
        match selector {
            ColumnSelector::All => Ok(self.to_vec()),
            _ => Err(invalid_selector(self, selector)),
        }
    }
}

/// Resolve a table and a selector into a sample.
pub fn validate_column<T: Table + ?Sized>(table: &T, selector: &ColumnSelector) -> Result<Vec<f64>, EdaError> {
    table.values_of(selector)
}
