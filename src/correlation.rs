//! Correlation
//!
//! Pairwise correlation tables over the columns of a [`DataFrame`], and helpers
//! to rank features by their association with a target column.
use crate::data::{DataFrame, RowMajorMatrix};
use crate::errors::EdaError;
use crate::stats::{mean, rank_average};
use crate::utils::items_to_strings;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CorrelationMethod {
    /// Linear correlation.
    #[default]
    Pearson,
    /// Kendall's tau-b rank correlation.
    Kendall,
    /// Pearson correlation of the average ranks.
    Spearman,
}

impl FromStr for CorrelationMethod {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "kendall" => Ok(CorrelationMethod::Kendall),
            "spearman" => Ok(CorrelationMethod::Spearman),
            _ => Err(EdaError::ParseString(
                s.to_string(),
                "CorrelationMethod".to_string(),
                items_to_strings(vec!["pearson", "kendall", "spearman"]),
            )),
        }
    }
}

/// A square, symmetric table of correlations between named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: RowMajorMatrix<f64>,
    pub method: CorrelationMethod,
}

impl CorrelationMatrix {
    fn index_of(&self, name: &str) -> Result<usize, EdaError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| EdaError::ColumnNotFound(name.to_string()))
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Result<f64, EdaError> {
        Ok(*self.values.get(self.index_of(a)?, self.index_of(b)?))
    }

    /// Correlations of every column with `name`, in matrix order.
    pub fn column(&self, name: &str) -> Result<Vec<(String, f64)>, EdaError> {
        let j = self.index_of(name)?;
        Ok(self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), *self.values.get(i, j)))
            .collect())
    }

    /// Correlations with `target`, highest first, `NaN` last.
    pub fn sorted_by(&self, target: &str) -> Result<Vec<(String, f64)>, EdaError> {
        let mut col = self.column(target)?;
        col.sort_by(|a, b| descending_nan_last(a.1, b.1));
        Ok(col)
    }

    /// The same table with its rows and columns in the given order.
    pub fn reorder<S: AsRef<str>>(&self, order: &[S]) -> Result<CorrelationMatrix, EdaError> {
        let idx = order
            .iter()
            .map(|n| self.index_of(n.as_ref()))
            .collect::<Result<Vec<_>, EdaError>>()?;
        let mut data = Vec::with_capacity(idx.len() * idx.len());
        for i in &idx {
            for j in &idx {
                data.push(*self.values.get(*i, *j));
            }
        }
        Ok(CorrelationMatrix {
            columns: idx.iter().map(|i| self.columns[*i].clone()).collect(),
            values: RowMajorMatrix::new(data, idx.len(), idx.len()),
            method: self.method,
        })
    }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

// Rows where neither value is missing.
fn complete_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

/// Pearson correlation of two equally long samples.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    let (mx, my) = (mean(x), mean(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Spearman rank correlation of two equally long samples.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&rank_average(x), &rank_average(y))
}

/// Kendall's tau-b of two equally long samples.
pub fn kendall(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let (mut concordant, mut discordant) = (0i64, 0i64);
    let (mut ties_x, mut ties_y) = (0i64, 0i64);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 {
                ties_x += 1;
            }
            if dy == 0.0 {
                ties_y += 1;
            }
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    let denom = tau_b_denominator((n * (n - 1) / 2) as i64, ties_x, ties_y);
    if denom == 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / denom
}

// Pair-count product in f64; in i64 it overflows past ~77k rows.
fn tau_b_denominator(n0: i64, ties_x: i64, ties_y: i64) -> f64 {
    ((n0 - ties_x) as f64 * (n0 - ties_y) as f64).sqrt()
}

fn correlate(x: &[f64], y: &[f64], method: CorrelationMethod) -> f64 {
    let (x, y) = complete_pairs(x, y);
    match method {
        CorrelationMethod::Pearson => pearson(&x, &y),
        CorrelationMethod::Kendall => kendall(&x, &y),
        CorrelationMethod::Spearman => spearman(&x, &y),
    }
}

fn self_correlation(x: &[f64]) -> f64 {
    let valid: Vec<f64> = x.iter().copied().filter(|v| !v.is_nan()).collect();
    match valid.first() {
        Some(first) if valid.len() > 1 && valid.iter().any(|v| v != first) => 1.0,
        _ => f64::NAN,
    }
}

/// Correlation between every pair of columns, using the rows where both are present.
///
/// Pairs are computed in parallel.
pub fn correlation_matrix(df: &DataFrame, method: CorrelationMethod) -> CorrelationMatrix {
    let k = df.n_cols();
    let pairs: Vec<(usize, usize)> = (0..k).flat_map(|i| (i..k).map(move |j| (i, j))).collect();
    let results: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let value = if i == j {
                self_correlation(df.column_at(i))
            } else {
                correlate(df.column_at(i), df.column_at(j), method)
            };
            (i, j, value)
        })
        .collect();

    let mut data = vec![f64::NAN; k * k];
    for (i, j, v) in results {
        data[i * k + j] = v;
        data[j * k + i] = v;
    }
    CorrelationMatrix {
        columns: df.columns().to_vec(),
        values: RowMajorMatrix::new(data, k, k),
        method,
    }
}

/// Correlation table with its columns ordered by descending correlation with `target`.
pub fn generate_correlation(
    df: &DataFrame,
    target: &str,
    method: CorrelationMethod,
) -> Result<CorrelationMatrix, EdaError> {
    let corr = correlation_matrix(df, method);
    let order: Vec<String> = corr.sorted_by(target)?.into_iter().map(|(c, _)| c).collect();
    corr.reorder(&order)
}

/// Features whose absolute correlation with `column` is above `threshold`, in
/// matrix order. The column itself is part of the result.
pub fn correlated_features(
    corr: &CorrelationMatrix,
    column: &str,
    threshold: f64,
) -> Result<Vec<(String, f64)>, EdaError> {
    Ok(corr
        .column(column)?
        .into_iter()
        .filter(|(_, v)| v.abs() > threshold)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CORRELATION_THRESHOLD;
    use crate::utils::precision_round;

    fn frame() -> DataFrame {
        DataFrame::from_columns(vec![
            ("RM".to_string(), vec![6.5, 6.4, 7.2, 7.0, 7.1, 6.4]),
            ("LSTAT".to_string(), vec![4.98, 9.14, 4.03, 2.94, 5.33, 5.21]),
            ("CONST".to_string(), vec![1.0; 6]),
            ("TARGET".to_string(), vec![24.0, 21.6, 34.7, 33.4, 36.2, 28.7]),
        ])
        .unwrap()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("kendall".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Kendall);
        assert!(matches!(
            "cosine".parse::<CorrelationMethod>(),
            Err(EdaError::ParseString(..))
        ));
    }

    #[test]
    fn test_pearson() {
        let x = vec![1., 2., 3., 4.];
        assert_eq!(pearson(&x, &[2., 4., 6., 8.]), 1.0);
        assert_eq!(pearson(&x, &[8., 6., 4., 2.]), -1.0);
        assert!(pearson(&x, &[1., 1., 1., 1.]).is_nan());
        assert_eq!(precision_round(pearson(&x, &[1., 3., 2., 4.]), 6), 0.8);
    }

    #[test]
    fn test_spearman_of_monotone_transform() {
        let x = vec![0.5, 1.0, 2.0, 3.5, 10.0];
        let y: Vec<f64> = x.iter().map(|v| v * v * v + 1.0).collect();
        assert_eq!(spearman(&x, &y), 1.0);
    }

    #[test]
    fn test_kendall_tau_b() {
        let x = vec![1., 2., 3., 4., 5.];
        assert_eq!(kendall(&x, &[1., 2., 3., 4., 5.]), 1.0);
        assert_eq!(kendall(&x, &[5., 4., 3., 2., 1.]), -1.0);
        // C = 8, D = 2
        assert_eq!(precision_round(kendall(&x, &[1., 3., 2., 5., 4.]), 6), 0.6);
        // one tie in y: (C - D) / sqrt(10 * 9)
        assert_eq!(precision_round(kendall(&x, &[1., 2., 2., 4., 5.]), 6), 0.948683);
    }

    #[test]
    fn test_tau_b_denominator_large_counts() {
        // 100_000 rows: n0 = 4_999_950_000, whose square is past i64::MAX
        let n0: i64 = 100_000 * 99_999 / 2;
        assert_eq!(tau_b_denominator(n0, 0, 0), n0 as f64);
        let d = tau_b_denominator(n0, 1_000, 4_000);
        assert!(d.is_finite() && d < n0 as f64);
        assert_eq!(precision_round(d / n0 as f64, 4), 1.0);
        assert_eq!(tau_b_denominator(10, 10, 3), 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let df = frame();
        for method in [
            CorrelationMethod::Pearson,
            CorrelationMethod::Kendall,
            CorrelationMethod::Spearman,
        ] {
            let corr = correlation_matrix(&df, method);
            assert_eq!(corr.columns.len(), 4);
            for i in 0..4 {
                for j in 0..4 {
                    let (a, b) = (*corr.values.get(i, j), *corr.values.get(j, i));
                    assert!(a == b || (a.is_nan() && b.is_nan()));
                }
            }
            assert_eq!(corr.get("RM", "RM").unwrap(), 1.0);
            assert!(corr.get("CONST", "CONST").unwrap().is_nan());
            assert!(corr.get("CONST", "TARGET").unwrap().is_nan());
        }
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let df = DataFrame::from_columns(vec![
            ("a".to_string(), vec![1., 2., f64::NAN, 4.]),
            ("b".to_string(), vec![2., 4., 100., 8.]),
        ])
        .unwrap();
        let corr = correlation_matrix(&df, CorrelationMethod::Pearson);
        assert_eq!(precision_round(corr.get("a", "b").unwrap(), 10), 1.0);
    }

    #[test]
    fn test_generate_correlation_orders_by_target() {
        let df = frame();
        let corr = generate_correlation(&df, "TARGET", CorrelationMethod::Pearson).unwrap();
        assert_eq!(corr.columns[0], "TARGET");
        assert_eq!(corr.columns[1], "RM");
        assert_eq!(corr.columns[2], "LSTAT");
        assert_eq!(corr.columns[3], "CONST");
        assert_eq!(*corr.values.get(0, 0), 1.0);
        assert!(generate_correlation(&df, "MEDV", CorrelationMethod::Pearson).is_err());
    }

    #[test]
    fn test_correlated_features() {
        let df = frame();
        let corr = correlation_matrix(&df, CorrelationMethod::Pearson);
        let features = correlated_features(&corr, "TARGET", DEFAULT_CORRELATION_THRESHOLD).unwrap();
        let names: Vec<&str> = features.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["RM", "LSTAT", "TARGET"]);
        assert!(features.iter().all(|(_, v)| v.abs() > 0.5));
        let sorted = corr.sorted_by("TARGET").unwrap();
        assert_eq!(sorted.last().unwrap().0, "CONST");
    }
}
