//! Outlier
//!
//! Outlier rules over a single numeric sample. Every rule is a pure function of
//! the sample and its parameters: thresholds are recomputed on each call and the
//! input is never modified.
//!
//! Masks use `true` for an observation that is *retained* by the rule.
//!
//! Degenerate spreads (a standard deviation or MAD of zero) are not errors.
//! The division yields `NaN` (or an infinity), every comparison against `NaN`
//! is `false`, and those observations are flagged as outliers.
use crate::constants::{
    DEFAULT_TAIL_PERCENTILE, DEFAULT_TRUNCATION_PERCENTAGE, DEFAULT_TUKEY_K, DEFAULT_WINSOR_LIMITS,
    DEFAULT_Z_THRESHOLD,
};
use crate::errors::EdaError;
use crate::selector::{ColumnSelector, Table};
use crate::stats::{mean, median, median_absolute_deviation, percentile, percentiles, std_population};
use crate::utils::{items_to_strings, validate_float_parameter, validate_non_empty};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which tail(s) of the distribution a robust rule acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Side {
    /// Only large values can be outliers.
    Upper,
    /// Only small values can be outliers.
    Lower,
    /// Both tails.
    #[default]
    Both,
}

impl FromStr for Side {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(Side::Upper),
            "lower" => Ok(Side::Lower),
            "both" => Ok(Side::Both),
            _ => Err(EdaError::InvalidSideParameter(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Side::Upper => "upper",
            Side::Lower => "lower",
            Side::Both => "both",
        };
        write!(f, "{}", s)
    }
}

/// A threshold derived from a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    Single(f64),
    /// Lower and upper value, in that order.
    Pair(f64, f64),
}

/// The result of applying an [`OutlierRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleOutput {
    /// Retain mask, one entry per observation.
    Mask(Vec<bool>),
    /// A calibrated threshold.
    Threshold(Threshold),
    /// A transformed copy of the sample.
    Sample(Vec<f64>),
}

impl RuleOutput {
    pub fn as_mask(&self) -> Option<&[bool]> {
        match self {
            RuleOutput::Mask(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_mask(self) -> Option<Vec<bool>> {
        match self {
            RuleOutput::Mask(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_threshold(&self) -> Option<Threshold> {
        match self {
            RuleOutput::Threshold(t) => Some(*t),
            _ => None,
        }
    }

    pub fn into_sample(self) -> Option<Vec<f64>> {
        match self {
            RuleOutput::Sample(s) => Some(s),
            _ => None,
        }
    }
}

/// The closed set of outlier rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutlierRule {
    /// Retain `|x - mean| / std < threshold`.
    ZScore { threshold: f64 },
    /// Retain values inside `[Q1 - k*IQR, Q3 + k*IQR]`.
    Tukey { k: f64 },
    /// Median and MAD based Z-score, on one or both tails.
    RobustZScore { threshold: f64, side: Side },
    /// Percentile of the robust Z-scores, to calibrate a [`OutlierRule::RobustZScore`] threshold.
    PercentileRobust { percentile: f64, side: Side },
    /// Retain values between the `percentage` and `100 - percentage` percentiles.
    TruncatedMean { percentage: f64 },
    /// Clamp the lowest and highest fractions of the sample.
    Winsorize { limits: (f64, f64) },
}

impl OutlierRule {
    pub fn z_score() -> Self {
        OutlierRule::ZScore {
            threshold: DEFAULT_Z_THRESHOLD,
        }
    }

    pub fn tukey() -> Self {
        OutlierRule::Tukey { k: DEFAULT_TUKEY_K }
    }

    pub fn robust_z_score(side: Side) -> Self {
        OutlierRule::RobustZScore {
            threshold: DEFAULT_Z_THRESHOLD,
            side,
        }
    }

    pub fn percentile_robust(side: Side) -> Self {
        OutlierRule::PercentileRobust {
            percentile: DEFAULT_TAIL_PERCENTILE,
            side,
        }
    }

    pub fn truncated_mean() -> Self {
        OutlierRule::TruncatedMean {
            percentage: DEFAULT_TRUNCATION_PERCENTAGE,
        }
    }

    pub fn winsorize() -> Self {
        OutlierRule::Winsorize {
            limits: DEFAULT_WINSOR_LIMITS,
        }
    }

    /// Short name of the rule.
    pub fn name(&self) -> &'static str {
        match self {
            OutlierRule::ZScore { .. } => "z_score",
            OutlierRule::Tukey { .. } => "tukey",
            OutlierRule::RobustZScore { .. } => "robust_z_score",
            OutlierRule::PercentileRobust { .. } => "percentile_robust",
            OutlierRule::TruncatedMean { .. } => "truncated_mean",
            OutlierRule::Winsorize { .. } => "winsorize",
        }
    }

    /// Apply the rule to a sample.
    pub fn apply(&self, sample: &[f64]) -> Result<RuleOutput, EdaError> {
        validate_non_empty(sample, "sample")?;
        let output = match *self {
            OutlierRule::ZScore { threshold } => RuleOutput::Mask(z_score_mask(sample, threshold)),
            OutlierRule::Tukey { k } => RuleOutput::Mask(tukey_mask(sample, k)),
            OutlierRule::RobustZScore { threshold, side } => {
                RuleOutput::Mask(robust_z_mask(sample, threshold, side))
            }
            OutlierRule::PercentileRobust { percentile, side } => {
                RuleOutput::Threshold(percentile_robust_threshold(sample, percentile, side)?)
            }
            OutlierRule::TruncatedMean { percentage } => {
                RuleOutput::Mask(truncated_mean_mask(sample, percentage)?)
            }
            OutlierRule::Winsorize { limits } => RuleOutput::Sample(winsorize(sample, limits)?),
        };
        if let RuleOutput::Mask(mask) = &output {
            debug!(
                "{} flagged {} of {} observations.",
                self.name(),
                outlier_count(mask),
                sample.len()
            );
        }
        Ok(output)
    }

    /// Resolve the selector against the table, then apply the rule.
    pub fn apply_to<T: Table + ?Sized>(&self, table: &T, selector: &ColumnSelector) -> Result<RuleOutput, EdaError> {
        let sample = table.values_of(selector)?;
        self.apply(&sample)
    }
}

impl FromStr for OutlierRule {
    type Err = EdaError;

    /// Parse a rule name into the rule with its default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "z_score" => Ok(OutlierRule::z_score()),
            "tukey" => Ok(OutlierRule::tukey()),
            "robust_z_score" => Ok(OutlierRule::robust_z_score(Side::Both)),
            "percentile_robust" => Ok(OutlierRule::percentile_robust(Side::Both)),
            "truncated_mean" => Ok(OutlierRule::truncated_mean()),
            "winsorize" => Ok(OutlierRule::winsorize()),
            _ => Err(EdaError::ParseString(
                s.to_string(),
                "OutlierRule".to_string(),
                items_to_strings(vec![
                    "z_score",
                    "tukey",
                    "robust_z_score",
                    "percentile_robust",
                    "truncated_mean",
                    "winsorize",
                ]),
            )),
        }
    }
}

/// Z-score retain mask, using the population standard deviation.
pub fn z_score_mask(sample: &[f64], threshold: f64) -> Vec<bool> {
    let m = mean(sample);
    let std_dev = std_population(sample);
    sample.iter().map(|x| ((x - m) / std_dev).abs() < threshold).collect()
}

/// Tukey's fences retain mask, inclusive on both ends.
pub fn tukey_mask(sample: &[f64], k: f64) -> Vec<bool> {
    let (lower, upper) = tukey_fences(sample, k);
    sample.iter().map(|x| *x >= lower && *x <= upper).collect()
}

/// The lower and upper Tukey fences.
pub fn tukey_fences(sample: &[f64], k: f64) -> (f64, f64) {
    let q = percentiles(sample, &[25.0, 75.0]);
    let iqr = q[1] - q[0];
    (q[0] - k * iqr, q[1] + k * iqr)
}

/// Signed robust Z-scores, `(x - median) / MAD`.
pub fn robust_z_scores(sample: &[f64]) -> Vec<f64> {
    let med = median(sample);
    let mad = median_absolute_deviation(sample);
    sample.iter().map(|x| (x - med) / mad).collect()
}

/// Robust Z-score retain mask.
///
/// `Both` retains `|rz| < threshold`, the one sided variants are inclusive:
/// `Upper` retains `rz <= threshold` and `Lower` retains `rz >= -threshold`.
pub fn robust_z_mask(sample: &[f64], threshold: f64, side: Side) -> Vec<bool> {
    let scores = robust_z_scores(sample);
    match side {
        Side::Upper => scores.iter().map(|z| *z <= threshold).collect(),
        Side::Lower => scores.iter().map(|z| *z >= -threshold).collect(),
        Side::Both => scores.iter().map(|z| z.abs() < threshold).collect(),
    }
}

/// Percentile(s) of the robust Z-scores, so that roughly a `percentile`
/// fraction of the sample lies beyond the returned value on each requested tail.
pub fn percentile_robust_threshold(sample: &[f64], percentile_: f64, side: Side) -> Result<Threshold, EdaError> {
    validate_float_parameter(percentile_, 0.0, 1.0, "percentile")?;
    let scores = robust_z_scores(sample);
    let lower_q = percentile_ * 100.0;
    let upper_q = 100.0 - percentile_ * 100.0;
    let threshold = match side {
        Side::Upper => Threshold::Single(percentile(&scores, upper_q)),
        Side::Lower => Threshold::Single(percentile(&scores, lower_q)),
        Side::Both => {
            let p = percentiles(&scores, &[lower_q, upper_q]);
            Threshold::Pair(p[0], p[1])
        }
    };
    Ok(threshold)
}

/// Truncated mean retain mask.
///
/// `percentage` is on a 0 to 100 scale and must lie within `[0, 50]`, beyond
/// that the interval would be inverted.
pub fn truncated_mean_mask(sample: &[f64], percentage: f64) -> Result<Vec<bool>, EdaError> {
    validate_float_parameter(percentage, 0.0, 50.0, "percentage")?;
    let p = percentiles(sample, &[percentage, 100.0 - percentage]);
    let (lower, upper) = (p[0], p[1]);
    Ok(sample.iter().map(|x| *x >= lower && *x <= upper).collect())
}

/// Winsorize a sample.
///
/// The `floor(limits.0 * n)` smallest values are replaced by the smallest
/// value left untouched, and the `floor(limits.1 * n)` largest values by the
/// largest value left untouched. Length and order are preserved. A limit
/// that would clamp every value is rejected.
pub fn winsorize(sample: &[f64], limits: (f64, f64)) -> Result<Vec<f64>, EdaError> {
    let (low, up) = limits;
    validate_float_parameter(low, 0.0, 1.0, "limits[0]")?;
    validate_float_parameter(up, 0.0, 1.0, "limits[1]")?;
    if low + up > 1.0 {
        return Err(EdaError::InvalidParameter(
            "limits".to_string(),
            "limits summing to at most 1".to_string(),
            format!("({}, {})", low, up),
        ));
    }
    let n = sample.len();
    let mut out = sample.to_vec();
    if n == 0 {
        return Ok(out);
    }
    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|a, b| sample[*a].total_cmp(&sample[*b]));

    let low_count = (low * n as f64) as usize;
    let up_count = (up * n as f64) as usize;
    if low_count >= n || up_count >= n {
        return Err(EdaError::InvalidParameter(
            "limits".to_string(),
            format!("limits leaving at least one of {} values untouched on each side", n),
            format!("({}, {})", low, up),
        ));
    }
    if low_count > 0 {
        let fill = sample[idx[low_count]];
        for i in &idx[..low_count] {
            out[*i] = fill;
        }
    }
    // The upper fill is read after the lower tail is clamped, so overlapping tails collapse to one value.
    let up_start = n - up_count;
    if up_count > 0 {
        let fill = out[idx[up_start - 1]];
        for i in &idx[up_start..] {
            out[*i] = fill;
        }
    }
    Ok(out)
}

/// Keep the observations the mask retains.
pub fn filter_by_mask(sample: &[f64], mask: &[bool]) -> Result<Vec<f64>, EdaError> {
    if sample.len() != mask.len() {
        return Err(EdaError::ShapeMismatch(format!(
            "mask of length {} for a sample of length {}",
            mask.len(),
            sample.len()
        )));
    }
    Ok(sample.iter().zip(mask).filter(|(_, m)| **m).map(|(x, _)| *x).collect())
}

/// Number of observations flagged as outliers.
pub fn outlier_count(mask: &[bool]) -> usize {
    mask.iter().filter(|m| !**m).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataFrame, Matrix};
    use crate::stats::sorted;
    use crate::utils::precision_round;

    const T: bool = true;
    const F: bool = false;

    fn skewed() -> Vec<f64> {
        vec![
            1.2, 0.8, 1.1, 0.9, 1.0, 1.3, 0.7, 1.05, 0.95, 1.15, 2.5, 0.85, 1.25, 4.0, 0.6, 1.02, -1.5, 0.98,
        ]
    }

    #[test]
    fn test_z_score_flags_large_value() {
        let sample = vec![1., 2., 3., 4., 5., 100.];
        assert_eq!(z_score_mask(&sample, 2.0), vec![T, T, T, T, T, F]);
        assert_eq!(z_score_mask(&sample, 3.0), vec![T; 6]);
    }

    #[test]
    fn test_z_score_zero_std_flags_everything() {
        let sample = vec![5., 5., 5.];
        assert_eq!(z_score_mask(&sample, 3.0), vec![F, F, F]);
    }

    #[test]
    fn test_z_score_mask_length() {
        for n in 1..20 {
            let sample: Vec<f64> = (0..n).map(|i| (i * i) as f64).collect();
            assert_eq!(z_score_mask(&sample, 1.0).len(), n);
        }
    }

    #[test]
    fn test_tukey_fences() {
        let sample = vec![10., 12., 11., 13., 12., 1000.];
        let (lower, upper) = tukey_fences(&sample, 1.5);
        assert_eq!(lower, 9.0);
        assert_eq!(upper, 15.0);
        assert_eq!(tukey_mask(&sample, 1.5), vec![T, T, T, T, T, F]);
    }

    #[test]
    fn test_tukey_retains_interquartile_range() {
        let sample = skewed();
        let q = percentiles(&sample, &[25.0, 75.0]);
        let mask = tukey_mask(&sample, 1.5);
        for (x, m) in sample.iter().zip(&mask) {
            if *x >= q[0] && *x <= q[1] {
                assert!(*m);
            }
        }
        let zero_k = tukey_mask(&sample, 0.0);
        assert!(outlier_count(&zero_k) > 0);
    }

    #[test]
    fn test_robust_z_both_is_upper_and_lower() {
        let sample = skewed();
        for t in [0.5, 1.0, 2.0, 3.0, 10.0] {
            let both = robust_z_mask(&sample, t, Side::Both);
            let upper = robust_z_mask(&sample, t, Side::Upper);
            let lower = robust_z_mask(&sample, t, Side::Lower);
            let combined: Vec<bool> = upper.iter().zip(&lower).map(|(u, l)| *u && *l).collect();
            // Only the exact boundary |rz| == t can differ, which this sample avoids.
            assert_eq!(both, combined);
        }
    }

    #[test]
    fn test_robust_z_one_sided() {
        let sample = vec![1., 2., 3., 4., 5., 100., -100.];
        // median 3, MAD 2
        assert_eq!(robust_z_mask(&sample, 3.0, Side::Upper), vec![T, T, T, T, T, F, T]);
        assert_eq!(robust_z_mask(&sample, 3.0, Side::Lower), vec![T, T, T, T, T, T, F]);
        assert_eq!(robust_z_mask(&sample, 3.0, Side::Both), vec![T, T, T, T, T, F, F]);
    }

    #[test]
    fn test_robust_z_zero_mad() {
        let sample = vec![2., 2., 2., 2., 9.];
        // 0/0 is NaN for the median values, 7/0 is infinite for the last.
        assert_eq!(robust_z_mask(&sample, 3.0, Side::Both), vec![F; 5]);
        assert_eq!(robust_z_mask(&sample, 3.0, Side::Lower), vec![F, F, F, F, T]);
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("upper".parse::<Side>().unwrap(), Side::Upper);
        assert_eq!("lower".parse::<Side>().unwrap(), Side::Lower);
        assert_eq!("both".parse::<Side>().unwrap(), Side::Both);
        match "sideways".parse::<Side>() {
            Err(EdaError::InvalidSideParameter(s)) => assert_eq!(s, "sideways"),
            _ => panic!("expected an invalid side error"),
        }
        assert_eq!(Side::Lower.to_string(), "lower");
    }

    #[test]
    fn test_percentile_robust_threshold() {
        let sample = vec![1., 2., 3., 4., 5., 100., -100.];
        let upper = percentile_robust_threshold(&sample, 0.1, Side::Upper).unwrap();
        let lower = percentile_robust_threshold(&sample, 0.1, Side::Lower).unwrap();
        let both = percentile_robust_threshold(&sample, 0.1, Side::Both).unwrap();
        match (upper, lower, both) {
            (Threshold::Single(hi), Threshold::Single(lo), Threshold::Pair(blo, bhi)) => {
                assert_eq!(precision_round(hi, 6), 20.0);
                assert_eq!(precision_round(lo, 6), -21.2);
                assert_eq!(blo, lo);
                assert_eq!(bhi, hi);
            }
            _ => panic!("unexpected threshold shapes"),
        }
    }

    #[test]
    fn test_percentile_robust_pair_is_ordered() {
        let sample = skewed();
        for p in [0.01, 0.05, 0.1, 0.25, 0.49] {
            match percentile_robust_threshold(&sample, p, Side::Both).unwrap() {
                Threshold::Pair(lo, hi) => assert!(lo <= hi),
                _ => panic!("expected a pair"),
            }
        }
    }

    #[test]
    fn test_percentile_robust_calibrates_robust_z() {
        let sample: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let hi = match percentile_robust_threshold(&sample, 0.05, Side::Upper).unwrap() {
            Threshold::Single(v) => v,
            _ => panic!("expected a single value"),
        };
        let mask = robust_z_mask(&sample, hi, Side::Upper);
        assert_eq!(outlier_count(&mask), 5);
    }

    #[test]
    fn test_truncated_mean() {
        let sample: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        // 10th percentile is 1.9, 90th is 9.1
        assert_eq!(
            truncated_mean_mask(&sample, 10.0).unwrap(),
            vec![F, T, T, T, T, T, T, T, T, F]
        );
        assert_eq!(truncated_mean_mask(&sample, 0.0).unwrap(), vec![T; 10]);
        assert!(truncated_mean_mask(&sample, 60.0).is_err());
        assert!(truncated_mean_mask(&sample, -1.0).is_err());
    }

    #[test]
    fn test_winsorize() {
        let sample: Vec<f64> = vec![92., 19., 101., 58., 1053., 91., 26., 78., 10., 13., -40., 101., 86., 85., 15., 89., 89., 28., -5., 41.];
        let out = winsorize(&sample, (0.05, 0.05)).unwrap();
        // one value clamped on each side
        let expected: Vec<f64> = vec![92., 19., 101., 58., 101., 91., 26., 78., 10., 13., -5., 101., 86., 85., 15., 89., 89., 28., -5., 41.];
        assert_eq!(out, expected);
        assert_eq!(out.len(), sample.len());
    }

    #[test]
    fn test_winsorize_identity_and_bounds() {
        let sample = skewed();
        assert_eq!(winsorize(&sample, (0.0, 0.0)).unwrap(), sample);
        // 18 values: floor(1.8) = 1 clamped low, floor(3.6) = 3 clamped high
        let out = winsorize(&sample, (0.1, 0.2)).unwrap();
        let s = sorted(&sample);
        assert_eq!(out.len(), sample.len());
        assert!(out.iter().all(|x| *x >= s[1] && *x <= s[14]));
        let changed = out.iter().zip(&sample).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 4);
        assert!(winsorize(&sample, (0.6, 0.6)).is_err());
        assert!(winsorize(&sample, (-0.1, 0.0)).is_err());
    }

    #[test]
    fn test_winsorize_overlapping_tails() {
        let sample: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert_eq!(winsorize(&sample, (0.5, 0.5)).unwrap(), vec![6.0; 10]);
        assert_eq!(winsorize(&sample, (0.4, 0.6)).unwrap(), vec![5.0; 10]);
        assert!(matches!(
            winsorize(&sample, (1.0, 0.0)),
            Err(EdaError::InvalidParameter(..))
        ));
        assert!(matches!(
            winsorize(&sample, (0.0, 1.0)),
            Err(EdaError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_rule_dispatch() {
        let sample = vec![1., 2., 3., 4., 5., 100.];
        let mask = OutlierRule::ZScore { threshold: 2.0 }.apply(&sample).unwrap();
        assert_eq!(mask.as_mask().unwrap(), &[T, T, T, T, T, F]);
        let threshold = OutlierRule::percentile_robust(Side::Upper).apply(&sample).unwrap();
        assert!(matches!(threshold.as_threshold(), Some(Threshold::Single(_))));
        let winsorized = OutlierRule::winsorize().apply(&sample).unwrap().into_sample().unwrap();
        assert_eq!(winsorized, sample);
        assert!(OutlierRule::tukey().apply(&[]).is_err());
    }

    #[test]
    fn test_rule_apply_to_tables() {
        let df = DataFrame::from_columns(vec![
            ("CRIM".to_string(), vec![10., 12., 11., 13., 12., 1000.]),
            ("TARGET".to_string(), vec![1., 2., 3., 4., 5., 6.]),
        ])
        .unwrap();
        let rule = OutlierRule::tukey();
        let mask = rule.apply_to(&df, &"CRIM".into()).unwrap().into_mask().unwrap();
        assert_eq!(mask, vec![T, T, T, T, T, F]);
        assert!(matches!(
            rule.apply_to(&df, &ColumnSelector::ByIndex(0)),
            Err(EdaError::InvalidColumnSelector { .. })
        ));

        let data = vec![10., 12., 11., 13., 12., 1000.];
        let m = Matrix::new(&data, 6, 1);
        assert!(rule.apply_to(&m, &ColumnSelector::ByIndex(0)).is_ok());
        assert!(matches!(
            rule.apply_to(&m, &"CRIM".into()),
            Err(EdaError::InvalidColumnSelector { .. })
        ));
    }

    #[test]
    fn test_rule_parsing() {
        assert_eq!("tukey".parse::<OutlierRule>().unwrap(), OutlierRule::Tukey { k: 1.5 });
        assert!("median".parse::<OutlierRule>().is_err());
    }

    #[test]
    fn test_filter_by_mask() {
        let sample = vec![1., 2., 3.];
        assert_eq!(filter_by_mask(&sample, &[T, F, T]).unwrap(), vec![1., 3.]);
        assert!(filter_by_mask(&sample, &[T]).is_err());
    }
}
