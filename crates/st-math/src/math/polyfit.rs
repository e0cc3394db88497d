//! Least-squares polynomial fitting.
//!
//! Solves the Vandermonde system with column scaling and an SVD, so
//! rank-deficient fits (fewer points than coefficients, repeated x) return the
//! minimum-norm solution instead of failing.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Polynomial with coefficients ordered from the highest power down to the
/// constant term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficient of `x^power` (0.0 when the power exceeds the degree).
    pub fn coefficient_of(&self, power: usize) -> f64 {
        if power > self.degree() || self.coefficients.is_empty() {
            return 0.0;
        }
        self.coefficients[self.degree() - power]
    }

    /// Evaluate with Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, c| acc * x + c)
    }
}

/// Error from polynomial fitting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("no points to fit")]
    Empty,

    #[error("length mismatch: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },

    #[error("non-finite input value")]
    NonFinite,

    #[error("least-squares solve failed: {0}")]
    Solver(&'static str),
}

/// Fit a polynomial of `degree` to (x, y) by least squares.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(FitError::Empty);
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let n = x.len();
    let cols = degree + 1;
    let raw = |i: usize, j: usize| x[i].powi((degree - j) as i32);

    // Column scaling keeps high powers from swamping the constant term.
    let scales: Vec<f64> = (0..cols)
        .map(|j| {
            let norm = (0..n).map(|i| raw(i, j).powi(2)).sum::<f64>().sqrt();
            if norm > 0.0 && norm.is_finite() {
                norm
            } else {
                1.0
            }
        })
        .collect();

    let a = DMatrix::from_fn(n, cols, |i, j| raw(i, j) / scales[j]);
    let b = DVector::from_column_slice(y);

    let svd = a.svd(true, true);
    let rcond = n.max(cols) as f64 * f64::EPSILON;
    let eps = rcond * svd.singular_values.max();
    let solution = svd.solve(&b, eps).map_err(FitError::Solver)?;

    Ok(Polynomial::new(
        solution
            .iter()
            .zip(&scales)
            .map(|(c, s)| c / s)
            .collect(),
    ))
}
