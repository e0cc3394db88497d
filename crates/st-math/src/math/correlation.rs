//! Pearson correlation with pairwise-complete observations.

use serde::{Deserialize, Serialize};

/// Pearson correlation of two equal-length series.
///
/// Returns `None` with fewer than two pairs or when either series has zero
/// variance. The result is clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom < 1e-300 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Pearson correlation over rows where both series have a value.
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    pearson(&xs, &ys)
}

/// A pair of series whose correlation passed a magnitude threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

/// Symmetric correlation matrix with labelled rows/columns.
///
/// Cells are `None` where the correlation is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Compute the pairwise-complete matrix for labelled columns.
    pub fn compute(columns: &[(String, Vec<Option<f64>>)]) -> Self {
        let k = columns.len();
        let mut values = vec![vec![None; k]; k];
        for i in 0..k {
            for j in i..k {
                let r = pearson_pairwise(&columns[i].1, &columns[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            labels: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Correlation between two labels, if both are present and defined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }

    /// Upper-triangle pairs with `|r| > threshold`, in label order.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<CorrelatedPair> {
        let mut pairs = Vec::new();
        for i in 0..self.labels.len() {
            for j in (i + 1)..self.labels.len() {
                if let Some(r) = self.values[i][j] {
                    if r.abs() > threshold {
                        pairs.push(CorrelatedPair {
                            first: self.labels[i].clone(),
                            second: self.labels[j].clone(),
                            correlation: r,
                        });
                    }
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_is_undefined() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_none());
        assert!(pearson(&[1.0], &[1.0]).is_none());
    }

    #[test]
    fn pairwise_skips_missing_rows() {
        let x = [Some(1.0), None, Some(3.0), Some(4.0)];
        let y = [Some(1.0), Some(100.0), Some(3.0), None];
        assert!((pearson_pairwise(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_and_reports_strong_pairs() {
        let cols = vec![
            ("a".to_string(), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b".to_string(), vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
            ("c".to_string(), vec![Some(1.0), Some(-1.0), Some(-1.0), Some(1.0)]),
        ];
        let m = CorrelationMatrix::compute(&cols);
        assert_eq!(m.get("a", "b"), m.get("b", "a"));
        assert!((m.get("a", "a").unwrap() - 1.0).abs() < 1e-12);

        let strong = m.strong_pairs(0.7);
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].first, "a");
        assert_eq!(strong[0].second, "b");
        assert!(strong[0].correlation < 0.0);
    }
}
