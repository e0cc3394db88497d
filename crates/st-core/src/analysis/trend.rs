//! Trend fitting and direction classification.
//!
//! Fits a least-squares polynomial over the sample index of a series and
//! classifies the direction from the linear coefficient with a dead band:
//! slopes within `±dead_band` are flat.

use serde::{Deserialize, Serialize};
use st_math::{min_max, polyfit, Polynomial};
use tracing::debug;

use crate::model::{EnrichedTable, NumericColumn};

/// Classified direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Rising => write!(f, "rising"),
            TrendDirection::Falling => write!(f, "falling"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

/// Configuration for trend fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Polynomial degree of the fit.
    pub degree: usize,
    /// Slopes with `|slope| <= dead_band` are flat.
    pub dead_band: f64,
    /// Minimum number of samples to fit at all.
    pub min_points: usize,
    /// Minimum number of samples before a forecast is produced.
    pub forecast_min_points: usize,
    /// Number of future samples to forecast.
    pub forecast_horizon: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            degree: 2,
            dead_band: 0.01,
            min_points: 2,
            forecast_min_points: 10,
            forecast_horizon: 5,
        }
    }
}

/// Classify a slope against the dead band.
pub fn classify_slope(slope: f64, dead_band: f64) -> TrendDirection {
    if slope > dead_band {
        TrendDirection::Rising
    } else if slope < -dead_band {
        TrendDirection::Falling
    } else {
        TrendDirection::Flat
    }
}

/// A forecast value at a future sample index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub index: usize,
    pub value: f64,
}

/// Result of fitting a trend to one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub metric: String,
    pub degree: usize,
    /// Coefficients from the highest power down to the constant term.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    /// Linear coefficient of the fit (change per sample).
    pub slope: f64,
    pub direction: TrendDirection,
    pub mean_residual: f64,
    pub max_residual: f64,
    pub current_value: f64,
    pub mean_value: f64,
    pub value_range: f64,
    pub n: usize,
    pub forecast: Vec<ForecastPoint>,
    pub interpretation: String,
}

/// Fit a trend to `values` taken at indices `0..n`.
///
/// Returns `None` below `config.min_points` samples or if the fit fails.
pub fn fit_trend(metric: &str, values: &[f64], config: &TrendConfig) -> Option<TrendFit> {
    let n = values.len();
    if n < config.min_points.max(2) {
        return None;
    }

    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let poly = match polyfit(&x, values, config.degree) {
        Ok(p) => p,
        Err(e) => {
            debug!(metric, error = %e, "trend fit failed");
            return None;
        }
    };

    let fitted: Vec<f64> = x.iter().map(|&xi| poly.eval(xi)).collect();
    let mean_value = values.iter().sum::<f64>() / n as f64;
    let residuals: Vec<f64> = values
        .iter()
        .zip(&fitted)
        .map(|(v, f)| (v - f).abs())
        .collect();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = values.iter().map(|v| (v - mean_value).powi(2)).sum();
    let r_squared = if ss_tot > 1e-15 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    let slope = poly.coefficient_of(1);
    let direction = classify_slope(slope, config.dead_band);
    let (lo, hi) = min_max(values)?;
    let current_value = *values.last()?;

    let forecast = if n >= config.forecast_min_points {
        forecast(&poly, n, config.forecast_horizon)
    } else {
        Vec::new()
    };

    let interpretation = interpret(metric, direction, slope, r_squared, current_value, mean_value);

    Some(TrendFit {
        metric: metric.to_string(),
        degree: config.degree,
        coefficients: poly.coefficients,
        r_squared,
        slope,
        direction,
        mean_residual: residuals.iter().sum::<f64>() / n as f64,
        max_residual: residuals.iter().copied().fold(0.0, f64::max),
        current_value,
        mean_value,
        value_range: hi - lo,
        n,
        forecast,
        interpretation,
    })
}

/// Fit the temperature trend of a table (missing values skipped).
pub fn fit_temperature_trend(table: &EnrichedTable, config: &TrendConfig) -> Option<TrendFit> {
    fit_trend(
        NumericColumn::Temperature.name(),
        &table.valid(NumericColumn::Temperature),
        config,
    )
}

fn forecast(poly: &Polynomial, n: usize, horizon: usize) -> Vec<ForecastPoint> {
    (n..n + horizon)
        .map(|index| ForecastPoint {
            index,
            value: poly.eval(index as f64),
        })
        .collect()
}

fn interpret(
    metric: &str,
    direction: TrendDirection,
    slope: f64,
    r_squared: f64,
    current: f64,
    mean: f64,
) -> String {
    let fit_quality = if r_squared >= 0.7 {
        "strong"
    } else if r_squared >= 0.3 {
        "moderate"
    } else {
        "weak"
    };
    match direction {
        TrendDirection::Flat => format!(
            "{metric} is flat around {mean:.2} (current {current:.2}, {fit_quality} fit, R²={r_squared:.2})"
        ),
        _ => format!(
            "{metric} is {direction} at {slope:+.4} per sample (current {current:.2}, mean {mean:.2}, {fit_quality} fit, R²={r_squared:.2})"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_band_edges() {
        assert_eq!(classify_slope(0.0099, 0.01), TrendDirection::Flat);
        assert_eq!(classify_slope(0.0101, 0.01), TrendDirection::Rising);
        assert_eq!(classify_slope(-0.0101, 0.01), TrendDirection::Falling);
        assert_eq!(classify_slope(0.01, 0.01), TrendDirection::Flat);
        assert_eq!(classify_slope(-0.01, 0.01), TrendDirection::Flat);
    }

    #[test]
    fn too_few_points_yield_nothing() {
        let cfg = TrendConfig::default();
        assert!(fit_trend("temperature", &[], &cfg).is_none());
        assert!(fit_trend("temperature", &[21.0], &cfg).is_none());
        assert!(fit_trend("temperature", &[21.0, 22.0], &cfg).is_some());
    }

    #[test]
    fn rising_line_is_classified_and_forecast() {
        let values: Vec<f64> = (0..12).map(|i| 20.0 + 0.5 * i as f64).collect();
        let fit = fit_trend("temperature", &values, &TrendConfig::default()).unwrap();
        assert_eq!(fit.direction, TrendDirection::Rising);
        assert!((fit.slope - 0.5).abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.forecast.len(), 5);
        assert_eq!(fit.forecast[0].index, 12);
        assert!((fit.forecast[0].value - 26.0).abs() < 1e-6);
        assert_eq!(fit.current_value, 25.5);
        assert!(fit.interpretation.contains("rising"));
    }

    #[test]
    fn short_series_has_no_forecast() {
        let values = [30.0, 29.0, 28.0, 27.0];
        let fit = fit_trend("temperature", &values, &TrendConfig::default()).unwrap();
        assert_eq!(fit.direction, TrendDirection::Falling);
        assert!(fit.forecast.is_empty());
    }

    #[test]
    fn constant_series_is_flat_with_zero_r_squared() {
        let fit = fit_trend("temperature", &[25.0; 8], &TrendConfig::default()).unwrap();
        assert_eq!(fit.direction, TrendDirection::Flat);
        assert_eq!(fit.r_squared, 0.0);
        assert!(fit.max_residual < 1e-9);
    }

    #[test]
    fn degree_zero_fit_is_flat_with_constant_forecast() {
        let values: Vec<f64> = (0..12).map(|i| 20.0 + 0.5 * i as f64).collect();
        let cfg = TrendConfig {
            degree: 0,
            ..TrendConfig::default()
        };
        let fit = fit_trend("temperature", &values, &cfg).unwrap();
        assert_eq!(fit.degree, 0);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.direction, TrendDirection::Flat);
        assert_eq!(fit.forecast.len(), 5);
        for point in &fit.forecast {
            assert!((point.value - fit.mean_value).abs() < 1e-9);
        }
    }
}
