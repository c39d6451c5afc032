//! Statistical analysis functions for numeric columns.
//!
//! All functions work on the parsed numeric values of one column. Undefined
//! moments (no spread) resolve to 0 instead of failing, and every statistic
//! stays finite for any finite input, including values near `f64::MAX`.

use crate::types::{Distribution, Histogram};
use crate::utils::{ratio, sort_floats};
use std::collections::{BTreeMap, HashMap};

/// Quantile levels reported for every numeric column, with their map keys.
pub(crate) const QUANTILE_LEVELS: [(f64, &str); 4] =
    [(0.25, "0.25"), (0.5, "0.5"), (0.75, "0.75"), (0.95, "0.95")];

/// Magnitudes outside `[1/LIMIT, LIMIT]` are rescaled before computing
/// moments; the fourth power of a deviation overflows near `1e77`.
const MOMENT_SCALE_LIMIT: f64 = 1e64;

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumericProfile {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (denominator `n`).
    pub std: f64,
    pub distribution: Distribution,
    /// Values sorted ascending, kept for outlier detection.
    pub sorted: Vec<f64>,
}

/// Compute the profile of a numeric column.
///
/// Returns `None` when there are no values.
pub(crate) fn describe(
    mut values: Vec<f64>,
    histogram_bins: usize,
    near_constant_threshold: f64,
) -> Option<NumericProfile> {
    if values.is_empty() {
        return None;
    }
    sort_floats(&mut values);

    let n = values.len();
    let min = values[0];
    let max = values[n - 1];
    let is_constant = min == max;

    // A constant column has exactly zero spread; summing would only add
    // rounding noise to the mean.
    let (mean, std, skewness, kurtosis) = if is_constant {
        (min, 0.0, 0.0, 0.0)
    } else {
        moments(&values, min.abs().max(max.abs()))
    };

    let quantiles: BTreeMap<String, f64> = QUANTILE_LEVELS
        .iter()
        .map(|(p, key)| (key.to_string(), quantile(&values, *p)))
        .collect();

    let zero_count = values.iter().filter(|v| **v == 0.0).count();
    let is_near_constant = !is_constant && mode_share(&values) > near_constant_threshold;

    let distribution = Distribution {
        histogram: histogram(&values, histogram_bins),
        quantiles,
        skewness,
        kurtosis,
        zero_ratio: ratio(zero_count, n),
        is_constant,
        is_near_constant,
    };

    Some(NumericProfile {
        min,
        max,
        mean,
        median: median(&values),
        std,
        distribution,
        sorted: values,
    })
}

/// Mean, population std, skewness and excess kurtosis.
///
/// Values are divided by `max_abs` first when their magnitude would overflow
/// or underflow the fourth moment. Skewness and kurtosis are scale-free, so
/// only the mean and std are scaled back.
fn moments(values: &[f64], max_abs: f64) -> (f64, f64, f64, f64) {
    let scale = if max_abs > MOMENT_SCALE_LIMIT || max_abs < 1.0 / MOMENT_SCALE_LIMIT {
        max_abs
    } else {
        1.0
    };

    let n = values.len() as f64;
    let scaled_mean = values.iter().map(|v| v / scale).sum::<f64>() / n;

    let (mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v / scale - scaled_mean;
        let d2 = d * d;
        s2 += d2;
        s3 += d2 * d;
        s4 += d2 * d2;
    }
    let (m2, m3, m4) = (s2 / n, s3 / n, s4 / n);

    let mean = scaled_mean * scale;
    let std = m2.sqrt() * scale;
    if m2 == 0.0 {
        return (mean, 0.0, 0.0, 0.0);
    }

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2) - 3.0;
    (mean, std, finite_or_zero(skewness), finite_or_zero(kurtosis))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Point at fraction `t` between `a` and `b`, without overflowing on `b - a`.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let span = b - a;
    if span.is_finite() {
        a + t * span
    } else {
        a * (1.0 - t) + b * t
    }
}

/// Median of sorted values; the mean of the two middle values for even counts.
pub(crate) fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        lerp(sorted[n / 2 - 1], sorted[n / 2], 0.5)
    }
}

/// Quantile of sorted values by linear interpolation at rank `(n - 1) * p`.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    if frac == 0.0 {
        return sorted[lo];
    }
    lerp(sorted[lo], sorted[hi], frac)
}

/// Equal-width histogram between the first and last sorted values.
///
/// The last bucket is closed on the right. When all values are equal there
/// is a single bucket.
pub(crate) fn histogram(sorted: &[f64], bins: usize) -> Histogram {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    if min == max || bins <= 1 {
        return Histogram {
            counts: vec![sorted.len()],
            edges: vec![min, max],
        };
    }

    let span = max - min;
    let mut counts = vec![0usize; bins];
    for v in sorted {
        let position = if span.is_finite() {
            (v - min) / span
        } else {
            (v / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
        };
        let idx = ((position * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let mut edges: Vec<f64> = (0..bins)
        .map(|i| lerp(min, max, i as f64 / bins as f64))
        .collect();
    edges.push(max);

    Histogram { counts, edges }
}

/// Share of the most frequent value.
fn mode_share(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for v in values {
        // -0.0 and 0.0 are the same value
        *counts.entry((v + 0.0).to_bits()).or_insert(0) += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    ratio(top, values.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(values: &[f64]) -> NumericProfile {
        describe(values.to_vec(), 10, 0.95).unwrap()
    }

    // ==================== central tendency ====================

    #[test]
    fn test_basic_stats() {
        let p = profile(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(p.min, 1.0);
        assert_eq!(p.max, 4.0);
        assert_eq!(p.mean, 2.5);
        assert_eq!(p.median, 2.5);
        // Population variance = 1.25
        assert!((p.std - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&[1.0, 5.0, 9.0]), 5.0);
    }

    #[test]
    fn test_empty_values_have_no_profile() {
        assert!(describe(Vec::new(), 10, 0.95).is_none());
    }

    // ==================== quantiles ====================

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&sorted, 0.25), 2.0);
        assert_eq!(quantile(&sorted, 0.5), 3.0);
        // h = 3.8
        assert!((quantile(&sorted, 0.95) - 4.8).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_quantiles_are_non_decreasing() {
        let p = profile(&[10.0, -3.0, 2.5, 2.5, 100.0, 0.0, 7.0]);
        let q = &p.distribution.quantiles;
        assert!(q["0.25"] <= q["0.5"]);
        assert!(q["0.5"] <= q["0.75"]);
        assert!(q["0.75"] <= q["0.95"]);
    }

    // ==================== histogram ====================

    #[test]
    fn test_histogram_last_bucket_inclusive() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.counts.iter().sum::<usize>(), 5);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let h = histogram(&[3.0, 3.0, 3.0], 10);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.edges, vec![3.0, 3.0]);
    }

    // ==================== shape ====================

    #[test]
    fn test_symmetric_skewness_is_zero() {
        let p = profile(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(p.distribution.skewness.abs() < 1e-12);
        // Uniform-like: m4/m2^2 = 1.7, excess = -1.3
        assert!((p.distribution.kurtosis + 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_right_tail_has_positive_skew() {
        let p = profile(&[1.0, 1.0, 1.0, 1.0, 10.0]);
        assert!(p.distribution.skewness > 0.0);
    }

    #[test]
    fn test_constant_column() {
        let p = profile(&[0.1, 0.1, 0.1]);
        assert_eq!(p.std, 0.0);
        assert_eq!(p.mean, 0.1);
        assert!(p.distribution.is_constant);
        assert!(!p.distribution.is_near_constant);
        assert_eq!(p.distribution.skewness, 0.0);
        assert_eq!(p.distribution.kurtosis, 0.0);
    }

    #[test]
    fn test_near_constant() {
        let mut values = vec![5.0; 99];
        values.push(6.0);
        let p = profile(&values);
        assert!(!p.distribution.is_constant);
        assert!(p.distribution.is_near_constant);

        let p = profile(&[5.0, 5.0, 6.0]);
        assert!(!p.distribution.is_near_constant);
    }

    // ==================== extreme magnitudes ====================

    fn assert_all_finite(p: &NumericProfile) {
        let d = &p.distribution;
        for value in [p.mean, p.median, p.std, d.skewness, d.kurtosis] {
            assert!(value.is_finite(), "non-finite statistic in {:?}", p);
        }
        assert!(d.quantiles.values().all(|q| q.is_finite()));
        assert!(d.histogram.edges.iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_huge_symmetric_values() {
        let p = profile(&[1e100, -1e100, 0.0]);
        assert_all_finite(&p);
        assert_eq!(p.mean, 0.0);
        assert!(p.distribution.skewness.abs() < 1e-12);
        // m4/m2^2 = 1.5 for {-1, 0, 1}
        assert!((p.distribution.kurtosis + 1.5).abs() < 1e-9);
        assert!((p.std / 1e100 - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_values_near_f64_max() {
        let p = profile(&[1.7e308, 1.7e308, 1.0]);
        assert_all_finite(&p);
        assert!(p.mean > 1.1e308 && p.mean < 1.2e308);
        assert!(p.distribution.skewness < 0.0);
        assert_eq!(p.distribution.histogram.counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_opposite_extremes_do_not_overflow_spans() {
        let p = profile(&[-1.7e308, 1.7e308, 0.0, 1.0]);
        assert_all_finite(&p);
        assert_eq!(p.distribution.histogram.counts.iter().sum::<usize>(), 4);
        assert_eq!(p.distribution.histogram.counts[0], 1);
        assert_eq!(p.distribution.histogram.counts[9], 1);
    }

    #[test]
    fn test_tiny_values() {
        let p = profile(&[1e-100, 2e-100, 3e-100]);
        assert_all_finite(&p);
        assert!(p.distribution.skewness.abs() < 1e-9);
        assert!(p.distribution.kurtosis < 0.0);
    }

    #[test]
    fn test_zero_ratio_counts_negative_zero() {
        let p = profile(&[0.0, -0.0, 1.0, 2.0]);
        assert_eq!(p.distribution.zero_ratio, 0.5);
    }
}
