//! Transform
//!
//! Feature engineering steps applied to a dataset before modelling: a
//! threshold based binary encoder, the D'Agostino and Pearson normality test,
//! and the `log1p` corrections driven by it.
use crate::constants::{DEFAULT_BINARY_THRESHOLD, MIN_NORMAL_TEST_SIZE};
use crate::data::{DataFrame, Matrix};
use crate::errors::EdaError;
use crate::stats::{central_moment, drop_nan, max, min, skewness};
use log::info;
use serde::{Deserialize, Serialize};

/// Encode every value as `1.0` when it reaches the threshold and `0.0` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryEncoder {
    pub threshold: f64,
    n_features_in: Option<usize>,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        BinaryEncoder::new(DEFAULT_BINARY_THRESHOLD)
    }
}

impl BinaryEncoder {
    pub fn new(threshold: f64) -> Self {
        BinaryEncoder {
            threshold,
            n_features_in: None,
        }
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> Option<usize> {
        self.n_features_in
    }

    /// Nothing is learned from the data apart from its number of features.
    pub fn fit(&mut self, x: &Matrix<f64>) -> &mut Self {
        self.n_features_in = Some(x.cols);
        self
    }

    fn check_n_features(&self, n: usize) -> Result<(), EdaError> {
        match self.n_features_in {
            Some(expected) if expected != n => Err(EdaError::InvalidParameter(
                "X".to_string(),
                format!("{} features", expected),
                format!("{} features", n),
            )),
            _ => Ok(()),
        }
    }

    /// Binary encoding of `x`, in the same column major layout.
    pub fn transform(&self, x: &Matrix<f64>) -> Result<Vec<f64>, EdaError> {
        self.check_n_features(x.cols)?;
        Ok(x.data
            .iter()
            .map(|v| if *v >= self.threshold { 1.0 } else { 0.0 })
            .collect())
    }

    pub fn fit_transform(&mut self, x: &Matrix<f64>) -> Result<Vec<f64>, EdaError> {
        self.fit(x).transform(x)
    }

    /// Output feature names. Encoding keeps one output per input feature, so
    /// these are the input names, or `x0, x1, ...` when none are given.
    pub fn feature_names_out(&self, input_features: Option<&[String]>) -> Result<Vec<String>, EdaError> {
        match (input_features, self.n_features_in) {
            (Some(names), _) => {
                self.check_n_features(names.len())?;
                Ok(names.to_vec())
            }
            (None, Some(n)) => Ok((0..n).map(|i| format!("x{}", i)).collect()),
            (None, None) => Err(EdaError::InvalidParameter(
                "input_features".to_string(),
                "feature names or a fitted encoder".to_string(),
                "neither".to_string(),
            )),
        }
    }
}

/// Result of the omnibus normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalTest {
    /// `z_skew^2 + z_kurtosis^2`.
    pub statistic: f64,
    /// Chi squared survival function with two degrees of freedom.
    pub p_value: f64,
}

/// Normality test result together with the decision at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityReport {
    pub statistic: f64,
    pub p_value: f64,
    pub reject_null: bool,
}

/// z score of the sample skewness.
pub fn skew_test(sample: &[f64]) -> Result<f64, EdaError> {
    let n = sample.len();
    if n < MIN_NORMAL_TEST_SIZE {
        return Err(EdaError::InsufficientData(MIN_NORMAL_TEST_SIZE, n));
    }
    let n = n as f64;
    let b2 = central_moment(sample, 3) / central_moment(sample, 2).powf(1.5);
    let mut y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    if y == 0.0 {
        y = 1.0;
    }
    let ya = y / alpha;
    Ok(delta * (ya + (ya * ya + 1.0).sqrt()).ln())
}

/// z score of the sample kurtosis (Anscombe and Glynn).
pub fn kurtosis_test(sample: &[f64]) -> Result<f64, EdaError> {
    let n = sample.len();
    if n < MIN_NORMAL_TEST_SIZE {
        return Err(EdaError::InsufficientData(MIN_NORMAL_TEST_SIZE, n));
    }
    let n = n as f64;
    let m2 = central_moment(sample, 2);
    let b2 = central_moment(sample, 4) / (m2 * m2);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = if denom == 0.0 {
        f64::NAN
    } else {
        denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).powf(1.0 / 3.0)
    };
    Ok((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

/// D'Agostino and Pearson's omnibus test of normality.
///
/// Needs at least eight observations. `NaN` values propagate to the result.
pub fn normal_test(sample: &[f64]) -> Result<NormalTest, EdaError> {
    let s = skew_test(sample)?;
    let k = kurtosis_test(sample)?;
    let statistic = s * s + k * k;
    Ok(NormalTest {
        statistic,
        p_value: (-statistic / 2.0).exp(),
    })
}

/// Run the normality test on a column and decide at level `alpha`.
pub fn dagostino_pearson_test(df: &DataFrame, target: &str, alpha: f64) -> Result<NormalityReport, EdaError> {
    let test = normal_test(df.column(target)?)?;
    Ok(NormalityReport {
        statistic: test.statistic,
        p_value: test.p_value,
        reject_null: test.p_value < alpha,
    })
}

fn log1p_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.ln_1p()).collect()
}

/// `log1p` the target column when the normality test rejects it at level `alpha`.
pub fn normalize_target(df: DataFrame, target: &str, alpha: f64) -> Result<DataFrame, EdaError> {
    let report = dagostino_pearson_test(&df, target, alpha)?;
    if !report.reject_null {
        info!("Column {} is normally distributed (p = {:.4}).", target, report.p_value);
        return Ok(df);
    }
    let transformed = log1p_all(df.column(target)?);
    let df = df.with_column(target, transformed)?;
    let after = dagostino_pearson_test(&df, target, alpha)?;
    if after.reject_null {
        info!(
            "Column {} is still not normally distributed after log1p (p = {:.4}).",
            target, after.p_value
        );
    } else {
        info!("Column {} is now normally distributed (p = {:.4}).", target, after.p_value);
    }
    Ok(df)
}

/// `log1p` the target and every feature whose absolute skew is above the threshold.
pub fn remove_skew(df: DataFrame, target: &str, skew_threshold: f64) -> Result<DataFrame, EdaError> {
    df.column(target)?;
    let mut order = vec![target.to_string()];
    order.extend(df.columns().iter().filter(|c| c.as_str() != target).cloned());

    let mut df = df;
    for name in order {
        let values = df.column(&name)?;
        if skewness(&drop_nan(values)).abs() > skew_threshold {
            let transformed = log1p_all(values);
            info!("Applying log1p to skewed column {}.", name);
            df = df.with_column(&name, transformed)?;
        }
    }
    Ok(df)
}

/// Rescale to the unit interval. A constant sample has no range and maps to `NaN`.
pub fn min_max_scale(sample: &[f64]) -> Vec<f64> {
    let (lo, hi) = (min(sample), max(sample));
    sample.iter().map(|x| (x - lo) / (hi - lo)).collect()
}
