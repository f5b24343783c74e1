//! Summary
//!
//! Per column summaries of a [`DataFrame`]. Missing values are skipped, the
//! way a pandas summary treats them.
use crate::constants::DEFAULT_TUKEY_K;
use crate::data::DataFrame;
use crate::stats::{drop_nan, kurtosis, max, mean, min, percentiles, skewness, std_sample};
use crate::utils::fmt_vec_output;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Count, location, spread and quartiles of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise a single column.
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        let valid = drop_nan(values);
        let q = percentiles(&valid, &[25.0, 50.0, 75.0]);
        ColumnSummary {
            name: name.to_string(),
            count: valid.len(),
            mean: mean(&valid),
            std: std_sample(&valid),
            min: min(&valid),
            q25: q[0],
            q50: q[1],
            q75: q[2],
            max: max(&valid),
        }
    }

    /// Statistics in the order they are displayed.
    pub fn values(&self) -> Vec<f64> {
        vec![
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, fmt_vec_output(&self.values()))
    }
}

/// Summary of every column.
pub fn describe(df: &DataFrame) -> Vec<ColumnSummary> {
    df.columns()
        .iter()
        .enumerate()
        .map(|(j, name)| ColumnSummary::from_values(name, df.column_at(j)))
        .collect()
}

/// Summary of every column over the first `n` rows only.
pub fn describe_head(df: &DataFrame, n: usize) -> Vec<ColumnSummary> {
    describe(&df.head(n))
}

/// Bias corrected skew and excess kurtosis of every column, as `(name, skew, kurtosis)`.
pub fn skew_and_kurtosis(df: &DataFrame) -> Vec<(String, f64, f64)> {
    df.columns()
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let valid = drop_nan(df.column_at(j));
            (name.clone(), skewness(&valid), kurtosis(&valid))
        })
        .collect()
}

fn count_outside_fences(values: &[f64]) -> usize {
    let valid = drop_nan(values);
    let q = percentiles(&valid, &[25.0, 75.0]);
    let iqr = q[1] - q[0];
    let lower = q[0] - DEFAULT_TUKEY_K * iqr;
    let upper = q[1] + DEFAULT_TUKEY_K * iqr;
    valid.iter().filter(|&&x| x < lower || x > upper).count()
}

/// Number of values strictly outside the 1.5 IQR fences, per column.
pub fn iqr_outlier_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.columns()
        .iter()
        .enumerate()
        .map(|(j, name)| (name.clone(), count_outside_fences(df.column_at(j))))
        .collect()
}

/// Outlier counts as a percentage of the number of rows.
pub fn outlier_percentages(df: &DataFrame, counts: &[(String, usize)]) -> Vec<(String, f64)> {
    let n = df.n_rows() as f64;
    counts
        .iter()
        .map(|(name, count)| (name.clone(), *count as f64 * 100.0 / n))
        .collect()
}
