//! Data
//!
//! Containers for the tables the analysis runs on: a borrowed, column major
//! [`Matrix`] for unlabeled arrays, an owned [`DataFrame`] with named columns,
//! and a [`RowMajorMatrix`] used to hand results back to the caller.
use crate::errors::EdaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Contiguous Column Major Matrix data container.
///
/// This structure holds a dense matrix of values in a single contiguous memory block.
/// It follows column-major order (Fortran-style), so a column is a plain slice.
///
/// # Type Parameters
/// * `T` - The numeric type of the data (e.g., `f32`, `f64`).
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
    stride1: usize,
    stride2: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix {
            data,
            rows,
            cols,
            stride1: rows,
            stride2: 1,
        }
    }

    /// Create a new Matrix, checking that the data holds exactly `rows * cols` items.
    pub fn try_new(data: &'a [T], rows: usize, cols: usize) -> Result<Self, EdaError> {
        if data.len() != rows * cols {
            return Err(EdaError::ShapeMismatch(format!(
                "{} values cannot form a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix::new(data, rows, cols))
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.item_index(i, j)]
    }

    fn item_index(&self, i: usize, j: usize) -> usize {
        let mut idx = self.stride2 * i;
        idx += j * self.stride1;
        idx
    }

    /// Get access to a row of the data, as an iterator.
    pub fn get_row_iter(&self, row: usize) -> std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, T>>> {
        self.data.iter().skip(row).step_by(self.rows)
    }

    /// Get a slice of a column in the matrix.
    ///
    /// * `col` - The index of the column to select.
    /// * `start_row` - The index of the start of the slice.
    /// * `end_row` - The index of the end of the slice of the column to select.
    pub fn get_col_slice(&self, col: usize, start_row: usize, end_row: usize) -> &[T] {
        let i = self.item_index(start_row, col);
        let j = self.item_index(end_row, col);
        &self.data[i..j]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        self.get_col_slice(col, 0, self.rows)
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        self.get_row_iter(row).copied().collect()
    }
}

impl<'a, T> fmt::Display for Matrix<'a, T>
where
    T: FromStr + std::fmt::Display,
    <T as FromStr>::Err: 'static + std::error::Error,
{
    /// Format a Matrix.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut val = String::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                val.push_str(self.get(i, j).to_string().as_str());
                if j == (self.cols - 1) {
                    val.push('\n');
                } else {
                    val.push(' ');
                }
            }
        }
        write!(f, "{}", val)
    }
}

/// A lightweight row major matrix, this is primarily
/// for returning data to the user, such as a square
/// table of pairwise statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMajorMatrix<T> {
    /// The raw data in row-major order.
    pub data: Vec<T>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    stride1: usize,
    stride2: usize,
}

impl<T> RowMajorMatrix<T> {
    /// Create a new RowMajorMatrix.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> Self {
        RowMajorMatrix {
            data,
            rows,
            cols,
            stride1: 1,
            stride2: cols,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.item_index(i, j)]
    }

    /// Get a row of the matrix as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.stride2..(i + 1) * self.stride2]
    }

    fn item_index(&self, i: usize, j: usize) -> usize {
        let mut idx = self.stride2 * i;
        idx += j * self.stride1;
        idx
    }
}

/// An owned table of `f64` values with named columns.
///
/// Values are stored column major, so every column is a contiguous slice.
/// Missing values are represented by `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<String>,
    data: Vec<f64>,
    rows: usize,
}

impl DataFrame {
    /// Create a new DataFrame from column names and column major data.
    ///
    /// * `columns` - Unique column names.
    /// * `data` - Values, one column after the other.
    /// * `rows` - Number of rows in every column.
    pub fn new(columns: Vec<String>, data: Vec<f64>, rows: usize) -> Result<Self, EdaError> {
        if data.len() != rows * columns.len() {
            return Err(EdaError::ShapeMismatch(format!(
                "{} values cannot fill {} columns of {} rows",
                data.len(),
                columns.len(),
                rows
            )));
        }
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].contains(c) {
                return Err(EdaError::ShapeMismatch(format!("duplicate column name {}", c)));
            }
        }
        Ok(DataFrame { columns, data, rows })
    }

    /// Create a new DataFrame from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self, EdaError> {
        let rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(rows * columns.len());
        for (name, values) in columns {
            if values.len() != rows {
                return Err(EdaError::ShapeMismatch(format!(
                    "column {} has {} rows, expected {}",
                    name,
                    values.len(),
                    rows
                )));
            }
            names.push(name);
            data.extend(values);
        }
        DataFrame::new(names, data, rows)
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Result<&[f64], EdaError> {
        self.column_index(name)
            .map(|j| self.column_at(j))
            .ok_or_else(|| EdaError::ColumnNotFound(name.to_string()))
    }

    /// Values of the jth column.
    pub fn column_at(&self, j: usize) -> &[f64] {
        &self.data[j * self.rows..(j + 1) * self.rows]
    }

    /// Get a single value.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.rows + i]
    }

    /// Get a row of the table as a vector.
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.n_cols()).map(|j| self.get(i, j)).collect()
    }

    /// Borrow the table as an unlabeled column major matrix.
    pub fn as_matrix(&self) -> Matrix<'_, f64> {
        Matrix::new(&self.data, self.rows, self.columns.len())
    }

    /// All values, row after row, as `DataFrame.values.ravel()` would return them.
    pub fn flatten_row_major(&self) -> Vec<f64> {
        (0..self.rows).flat_map(|i| self.row(i)).collect()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> DataFrame {
        let n = n.min(self.rows);
        self.take_rows(&(0..n).collect::<Vec<_>>())
    }

    /// A new table holding the given rows, in the given order.
    pub fn take_rows(&self, index: &[usize]) -> DataFrame {
        let mut data = Vec::with_capacity(index.len() * self.n_cols());
        for j in 0..self.n_cols() {
            let col = self.column_at(j);
            data.extend(index.iter().map(|&i| col[i]));
        }
        DataFrame {
            columns: self.columns.clone(),
            data,
            rows: index.len(),
        }
    }

    /// A new table holding the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame, EdaError> {
        let columns = names
            .iter()
            .map(|n| Ok((n.as_ref().to_string(), self.column(n.as_ref())?.to_vec())))
            .collect::<Result<Vec<_>, EdaError>>()?;
        if columns.is_empty() {
            return DataFrame::new(Vec::new(), Vec::new(), self.rows);
        }
        DataFrame::from_columns(columns)
    }

    /// A new table without the named column.
    pub fn drop_column(&self, name: &str) -> Result<DataFrame, EdaError> {
        let j = self
            .column_index(name)
            .ok_or_else(|| EdaError::ColumnNotFound(name.to_string()))?;
        let mut columns = self.columns.clone();
        columns.remove(j);
        let mut data = self.data.clone();
        data.drain(j * self.rows..(j + 1) * self.rows);
        Ok(DataFrame {
            columns,
            data,
            rows: self.rows,
        })
    }

    /// Replace the named column, or append it if it does not exist yet.
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<DataFrame, EdaError> {
        if values.len() != self.rows && !self.columns.is_empty() {
            return Err(EdaError::ShapeMismatch(format!(
                "column {} has {} rows, expected {}",
                name,
                values.len(),
                self.rows
            )));
        }
        match self.column_index(name) {
            Some(j) => {
                self.data[j * self.rows..(j + 1) * self.rows].copy_from_slice(&values);
            }
            None => {
                self.rows = values.len();
                self.columns.push(name.to_string());
                self.data.extend(values);
            }
        }
        Ok(self)
    }

    /// Read a table from a CSV file with a header row.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame, EdaError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EdaError::UnableToRead(format!("{}: {}", path.display(), e)))?;
        DataFrame::from_reader(file)
    }

    /// Read a table from any CSV source with a header row.
    ///
    /// Empty and non numeric fields are read as `NaN`.
    pub fn from_reader<R: Read>(reader: R) -> Result<DataFrame, EdaError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| EdaError::UnableToRead(e.to_string()))?
            .clone();
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut data_columns: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

        for result in csv_reader.records() {
            let record = result.map_err(|e| EdaError::UnableToRead(e.to_string()))?;
            for (j, col) in data_columns.iter_mut().enumerate() {
                let val = match record.get(j).map(str::trim) {
                    None | Some("") => f64::NAN,
                    Some(s) => s.parse::<f64>().unwrap_or(f64::NAN),
                };
                col.push(val);
            }
        }

        let rows = data_columns.first().map_or(0, Vec::len);
        let data: Vec<f64> = data_columns.into_iter().flatten().collect();
        DataFrame::new(columns, data, rows)
    }

    /// Write the table to a CSV file, `NaN` as an empty field.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), EdaError> {
        let path = path.as_ref();
        let to_err = |e: csv::Error| EdaError::UnableToWrite(format!("{}: {}", path.display(), e));
        let mut writer = csv::Writer::from_path(path).map_err(to_err)?;
        writer.write_record(&self.columns).map_err(to_err)?;
        for i in 0..self.rows {
            let record: Vec<String> = self
                .row(i)
                .iter()
                .map(|v| if v.is_nan() { String::new() } else { v.to_string() })
                .collect();
            writer.write_record(&record).map_err(to_err)?;
        }
        writer
            .flush()
            .map_err(|e| EdaError::UnableToWrite(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::from_columns(vec![
            ("a".to_string(), vec![1., 2., 3.]),
            ("b".to_string(), vec![4., 5., 6.]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rowmatrix_get() {
        let v = vec![1, 2, 3, 5, 6, 7];
        let m = RowMajorMatrix::new(v, 2, 3);
        assert_eq!(m.get(0, 0), &1);
        assert_eq!(m.get(1, 0), &5);
        assert_eq!(m.get(0, 2), &3);
        assert_eq!(m.get(1, 1), &6);
        assert_eq!(m.row(1), &[5, 6, 7]);
    }

    #[test]
    fn test_matrix_get() {
        let v = vec![1, 2, 3, 5, 6, 7];
        let m = Matrix::new(&v, 2, 3);
        println!("{}", m);
        assert_eq!(m.get(0, 0), &1);
        assert_eq!(m.get(1, 0), &2);
    }

    #[test]
    fn test_matrix_get_col_slice() {
        let v = vec![1, 2, 3, 5, 6, 7];
        let m = Matrix::new(&v, 3, 2);
        assert_eq!(m.get_col_slice(0, 0, 3), &vec![1, 2, 3]);
        assert_eq!(m.get_col_slice(1, 0, 2), &vec![5, 6]);
        assert_eq!(m.get_col_slice(1, 1, 3), &vec![6, 7]);
    }

    #[test]
    fn test_matrix_row() {
        let v = vec![1, 2, 3, 5, 6, 7];
        let m = Matrix::new(&v, 3, 2);
        assert_eq!(m.get_row(2), vec![3, 7]);
        assert_eq!(m.get_row(0), vec![1, 5]);
    }

    #[test]
    fn test_matrix_try_new_shape() {
        let v = vec![1., 2., 3.];
        assert!(Matrix::try_new(&v, 2, 2).is_err());
        assert!(Matrix::try_new(&v, 3, 1).is_ok());
    }

    #[test]
    fn test_dataframe_rejects_bad_shapes() {
        assert!(DataFrame::new(vec!["a".to_string()], vec![1., 2.], 3).is_err());
        assert!(DataFrame::new(vec!["a".to_string(), "a".to_string()], vec![1., 2.], 1).is_err());
        let res = DataFrame::from_columns(vec![("a".to_string(), vec![1.]), ("b".to_string(), vec![1., 2.])]);
        assert!(matches!(res, Err(EdaError::ShapeMismatch(_))));
    }

    #[test]
    fn test_dataframe_access() {
        let df = frame();
        assert_eq!(df.n_rows(), 3);
        assert_eq!(df.n_cols(), 2);
        assert_eq!(df.column("b").unwrap(), &[4., 5., 6.]);
        assert_eq!(df.row(1), vec![2., 5.]);
        assert_eq!(df.flatten_row_major(), vec![1., 4., 2., 5., 3., 6.]);
        assert!(matches!(df.column("c"), Err(EdaError::ColumnNotFound(_))));
        assert_eq!(df.as_matrix().get_col(1), &[4., 5., 6.]);
    }

    #[test]
    fn test_dataframe_reshaping() {
        let df = frame();
        let head = df.head(2);
        assert_eq!(head.column("a").unwrap(), &[1., 2.]);
        let taken = df.take_rows(&[2, 0]);
        assert_eq!(taken.column("b").unwrap(), &[6., 4.]);
        let selected = df.select(&["b", "a"]).unwrap();
        assert_eq!(selected.columns(), &["b".to_string(), "a".to_string()]);
        let dropped = df.drop_column("a").unwrap();
        assert_eq!(dropped.columns(), &["b".to_string()]);
        assert_eq!(dropped.column_at(0), &[4., 5., 6.]);
        let replaced = df.clone().with_column("a", vec![0., 0., 0.]).unwrap();
        assert_eq!(replaced.column("a").unwrap(), &[0., 0., 0.]);
        let appended = df.with_column("c", vec![7., 8., 9.]).unwrap();
        assert_eq!(appended.n_cols(), 3);
        assert_eq!(appended.get(2, 2), 9.);
    }

    #[test]
    fn test_dataframe_from_reader() {
        let text = "x, y\n1.5,2\n,abc\n3,4\n";
        let df = DataFrame::from_reader(text.as_bytes()).unwrap();
        assert_eq!(df.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(df.n_rows(), 3);
        assert_eq!(df.get(0, 0), 1.5);
        assert!(df.get(1, 0).is_nan());
        assert!(df.get(1, 1).is_nan());
        assert_eq!(df.get(2, 1), 4.);
    }

    #[test]
    fn test_dataframe_csv_round_trip() {
        let path = std::env::temp_dir().join("robust_eda_data_round_trip.csv");
        let df = DataFrame::from_columns(vec![
            ("a".to_string(), vec![1.25, f64::NAN]),
            ("b".to_string(), vec![-3., 1e-7]),
        ])
        .unwrap();
        df.write_csv(&path).unwrap();
        let read = DataFrame::read_csv(&path).unwrap();
        assert_eq!(read.columns(), df.columns());
        assert_eq!(read.get(0, 0), 1.25);
        assert!(read.get(1, 0).is_nan());
        assert_eq!(read.get(1, 1), 1e-7);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_csv_missing_file() {
        let res = DataFrame::read_csv("this/file/does/not/exist.csv");
        assert!(matches!(res, Err(EdaError::UnableToRead(_))));
    }
}
