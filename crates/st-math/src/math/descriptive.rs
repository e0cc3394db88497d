//! Descriptive statistics over finite samples.
//!
//! All functions take the valid (non-missing) values of a series. Estimators
//! follow the conventions of common dataframe libraries: sample (n−1)
//! variance, bias-adjusted skewness and excess kurtosis, and quantiles by
//! linear interpolation between order statistics.

use serde::{Deserialize, Serialize};

/// Central second moments below this are treated as zero (constant series).
const ZERO_MOMENT: f64 = 1e-14;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n−1 denominator). `None` below two samples.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation. `None` below two samples.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Population standard deviation (n denominator). `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / values.len() as f64).sqrt())
}

/// Sums of squared, cubed and fourth-power deviations from the mean.
fn central_sums(values: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(values)?;
    let mut s2 = 0.0;
    let mut s3 = 0.0;
    let mut s4 = 0.0;
    for v in values {
        let d = v - m;
        let d2 = d * d;
        s2 += d2;
        s3 += d2 * d;
        s4 += d2 * d2;
    }
    Some((s2, s3, s4))
}

/// Bias-adjusted sample skewness (G1).
///
/// `None` below three samples; `0.0` for a constant series.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let (s2, s3, _) = central_sums(values)?;
    if s2 < ZERO_MOMENT {
        return Some(0.0);
    }
    let n = n as f64;
    Some((n * (n - 1.0).sqrt() / (n - 2.0)) * (s3 / s2.powf(1.5)))
}

/// Bias-adjusted sample excess kurtosis (G2).
///
/// `None` below four samples; `0.0` for a constant series.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let (s2, _, s4) = central_sums(values)?;
    if s2 < ZERO_MOMENT {
        return Some(0.0);
    }
    let n = n as f64;
    let numerator = n * (n + 1.0) * (n - 1.0) * s4;
    let denominator = (n - 2.0) * (n - 3.0) * s2 * s2;
    let adj = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    Some(numerator / denominator - adj)
}

/// Quantile `q` in [0, 1] of an ascending-sorted slice, linearly interpolated.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Quantile of an unsorted slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), q)
}

/// Ascending copy of `values` (NaN-free input expected).
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Minimum and maximum. `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Full descriptive summary of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub range: f64,
    pub variance: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

/// Summarize a series of valid values. `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    let sorted = sorted_copy(values);
    let mean = mean(&sorted)?;
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let variance = sample_variance(&sorted);
    Some(Summary {
        count: sorted.len(),
        mean,
        std: variance.map(f64::sqrt),
        min,
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max,
        range: max - min,
        variance,
        skewness: skewness(&sorted),
        kurtosis: excess_kurtosis(&sorted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn mean_and_sample_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(mean(&v).unwrap(), 5.0, 1e-12));
        assert!(approx_eq(population_std(&v).unwrap(), 2.0, 1e-12));
        assert!(approx_eq(sample_std(&v).unwrap(), 2.138089935299395, 1e-12));
    }

    #[test]
    fn undefined_below_minimum_counts() {
        assert!(mean(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
        assert!(skewness(&[1.0, 2.0]).is_none());
        assert!(excess_kurtosis(&[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn constant_series_has_zero_shape() {
        let v = [3.0; 8];
        assert_eq!(skewness(&v), Some(0.0));
        assert_eq!(excess_kurtosis(&v), Some(0.0));
        assert_eq!(sample_std(&v), Some(0.0));
    }

    #[test]
    fn skew_and_kurtosis_reference_values() {
        let v = [1.0, 2.0, 3.0, 4.0, 10.0];
        assert!(approx_eq(skewness(&v).unwrap(), 1.6970563, 1e-6));
        assert!(approx_eq(excess_kurtosis(&v).unwrap(), 3.152, 1e-9));
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(quantile(&v, 0.25).unwrap(), 1.75, 1e-12));
        assert!(approx_eq(quantile(&v, 0.5).unwrap(), 2.5, 1e-12));
        assert!(approx_eq(quantile(&v, 0.75).unwrap(), 3.25, 1e-12));
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert!(quantile(&v, 1.5).is_none());
    }

    #[test]
    fn summarize_reports_range() {
        let s = summarize(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.range, 4.0);
        assert_eq!(s.median, 3.0);
        assert!(s.kurtosis.is_none());
        assert!(summarize(&[]).is_none());
    }

    proptest! {
        #[test]
        fn quantiles_are_bounded_and_monotone(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let (lo, hi) = min_max(&values).unwrap();
            let (qa, qb) = (a.min(b), a.max(b));
            let va = quantile(&values, qa).unwrap();
            let vb = quantile(&values, qb).unwrap();
            prop_assert!(va >= lo - 1e-9 && vb <= hi + 1e-9);
            prop_assert!(va <= vb + 1e-9);
        }
    }
}
