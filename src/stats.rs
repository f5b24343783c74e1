//! Stats
//!
//! Descriptive statistics over a single numeric sample.
//!
//! Unless stated otherwise these follow numpy semantics: a `NaN` anywhere in
//! the sample propagates to the result, and an empty sample yields `NaN`.
//! Use [`drop_nan`] first where pandas-style skipping is wanted.

/// Copy of the sample without its `NaN` values.
pub fn drop_nan(v: &[f64]) -> Vec<f64> {
    v.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Sorted copy of the sample, `NaN` values last.
pub fn sorted(v: &[f64]) -> Vec<f64> {
    let mut s = v.to_vec();
    s.sort_unstable_by(|a, b| a.total_cmp(b));
    s
}

fn has_nan(v: &[f64]) -> bool {
    v.iter().any(|x| x.is_nan())
}

/// Arithmetic mean.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Central moment of order `k`, normalised by `n`.
pub fn central_moment(v: &[f64], k: i32) -> f64 {
    let m = mean(v);
    v.iter().map(|x| (x - m).powi(k)).sum::<f64>() / v.len() as f64
}

fn variance(v: &[f64], ddof: usize) -> f64 {
    if v.len() <= ddof {
        return f64::NAN;
    }
    let m = mean(v);
    v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (v.len() - ddof) as f64
}

/// Population standard deviation (`ddof = 0`), as `np.std`.
pub fn std_population(v: &[f64]) -> f64 {
    variance(v, 0).sqrt()
}

/// Sample standard deviation (`ddof = 1`), as `pd.Series.std`.
pub fn std_sample(v: &[f64]) -> f64 {
    variance(v, 1).sqrt()
}

/// Minimum ignoring `NaN`.
pub fn min(v: &[f64]) -> f64 {
    v.iter().copied().filter(|x| !x.is_nan()).fold(f64::NAN, f64::min)
}

/// Maximum ignoring `NaN`.
pub fn max(v: &[f64]) -> f64 {
    v.iter().copied().filter(|x| !x.is_nan()).fold(f64::NAN, f64::max)
}

/// Median, as `np.median`.
pub fn median(v: &[f64]) -> f64 {
    if v.is_empty() || has_nan(v) {
        return f64::NAN;
    }
    let s = sorted(v);
    let n = s.len();
    if n % 2 == 1 {
        s[n / 2]
    } else {
        (s[n / 2 - 1] + s[n / 2]) / 2.0
    }
}

// Linear interpolation between two order statistics, the same way numpy
// does it so that results near 1.0 are computed from the upper neighbour.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

fn percentile_sorted(s: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 100.0);
    let pos = q / 100.0 * (s.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        s[lo]
    } else {
        lerp(s[lo], s[hi], pos - lo as f64)
    }
}

/// The `q`-th percentile (`q` on a 0 to 100 scale) using linear
/// interpolation between order statistics, as `np.percentile`.
pub fn percentile(v: &[f64], q: f64) -> f64 {
    if v.is_empty() || has_nan(v) || q.is_nan() {
        return f64::NAN;
    }
    percentile_sorted(&sorted(v), q)
}

/// Several percentiles of the same sample, sorting it only once.
pub fn percentiles(v: &[f64], qs: &[f64]) -> Vec<f64> {
    if v.is_empty() || has_nan(v) {
        return vec![f64::NAN; qs.len()];
    }
    let s = sorted(v);
    qs.iter()
        .map(|&q| if q.is_nan() { f64::NAN } else { percentile_sorted(&s, q) })
        .collect()
}

/// Median absolute deviation around the median, unscaled.
pub fn median_absolute_deviation(v: &[f64]) -> f64 {
    let med = median(v);
    let deviations: Vec<f64> = v.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

/// Bias corrected sample skewness, as `pd.Series.skew`.
///
/// Requires at least three values. A constant sample has a skew of zero.
pub fn skewness(v: &[f64]) -> f64 {
    let n = v.len() as f64;
    if v.len() < 3 {
        return f64::NAN;
    }
    let m = mean(v);
    let (m2, m3) = v.iter().fold((0.0, 0.0), |(m2, m3), x| {
        let d = x - m;
        (m2 + d * d, m3 + d * d * d)
    });
    if m2 == 0.0 {
        return 0.0;
    }
    (n * (n - 1.0).sqrt() / (n - 2.0)) * (m3 / m2.powf(1.5))
}

/// Bias corrected excess kurtosis, as `pd.Series.kurt`.
///
/// Requires at least four values. A constant sample has a kurtosis of zero.
pub fn kurtosis(v: &[f64]) -> f64 {
    let n = v.len() as f64;
    if v.len() < 4 {
        return f64::NAN;
    }
    let m = mean(v);
    let (m2, m4) = v.iter().fold((0.0, 0.0), |(m2, m4), x| {
        let d2 = (x - m) * (x - m);
        (m2 + d2, m4 + d2 * d2)
    });
    let numerator = n * (n + 1.0) * (n - 1.0) * m4;
    let denominator = (n - 2.0) * (n - 3.0) * m2 * m2;
    if denominator == 0.0 {
        return 0.0;
    }
    let adj = 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
    numerator / denominator - adj
}

/// One based ranks, ties receiving the average of the ranks they span.
pub fn rank_average(v: &[f64]) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_by(|a, b| v[*a].total_cmp(&v[*b]));
    let mut ranks = vec![0.0; v.len()];
    let mut i = 0;
    while i < idx.len() {
        let mut j = i;
        while j + 1 < idx.len() && v[idx[j + 1]] == v[idx[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for k in &idx[i..=j] {
            ranks[*k] = rank;
        }
        i = j + 1;
    }
    ranks
}
