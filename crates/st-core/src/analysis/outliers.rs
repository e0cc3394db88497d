//! Outlier detection by interquartile range or z-score.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use st_math::{mean, population_std, quantile_sorted, sorted_copy};

use crate::model::{EnrichedTable, NumericColumn};

/// Columns with fewer valid samples are not screened.
pub const MIN_SAMPLES: usize = 10;

/// Outlier detection rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Outside `[Q1 − k·IQR, Q3 + k·IQR]`.
    #[default]
    Iqr,
    /// `|x − mean| / σ > k` with the population σ.
    #[value(name = "zscore")]
    #[serde(rename = "zscore")]
    ZScore,
}

impl OutlierMethod {
    /// Conventional multiplier for this method.
    pub fn default_threshold(self) -> f64 {
        match self {
            OutlierMethod::Iqr => 1.5,
            OutlierMethod::ZScore => 3.0,
        }
    }
}

impl std::fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierMethod::Iqr => write!(f, "iqr"),
            OutlierMethod::ZScore => write!(f, "zscore"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    pub method: OutlierMethod,
    pub threshold: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            method: OutlierMethod::Iqr,
            threshold: OutlierMethod::Iqr.default_threshold(),
        }
    }
}

/// Outliers found in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub count: usize,
    /// Share of valid samples flagged, in percent.
    pub percentage: f64,
    /// Row indices in the full table.
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
    pub timestamps: Vec<Option<DateTime<Utc>>>,
    pub method: OutlierMethod,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub total_outliers: usize,
    pub columns_with_outliers: Vec<NumericColumn>,
}

/// Outliers across all screened columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Only columns with at least one outlier appear here.
    pub columns: BTreeMap<NumericColumn, ColumnOutliers>,
    pub summary: OutlierSummary,
}

impl OutlierReport {
    pub fn total(&self) -> usize {
        self.summary.total_outliers
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// `(Q1 − k·IQR, Q3 + k·IQR)` of an ascending-sorted slice.
pub fn iqr_bounds(sorted: &[f64], k: f64) -> Option<(f64, f64)> {
    let q1 = quantile_sorted(sorted, 0.25)?;
    let q3 = quantile_sorted(sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - k * iqr, q3 + k * iqr))
}

/// Screen every numeric column for outliers.
pub fn detect_outliers(table: &EnrichedTable, config: &OutlierConfig) -> OutlierReport {
    let mut report = OutlierReport::default();
    let timestamps = table.timestamps();

    for column in NumericColumn::ALL {
        let values = table.column(column);
        let valid: Vec<f64> = values.iter().flatten().copied().collect();
        if valid.len() < MIN_SAMPLES {
            continue;
        }
        let Some(found) = screen_column(&values, &valid, &timestamps, table.row_offset(), config)
        else {
            continue;
        };
        if found.count > 0 {
            report.summary.total_outliers += found.count;
            report.summary.columns_with_outliers.push(column);
            report.columns.insert(column, found);
        }
    }
    report
}

enum Rule {
    /// Exclusive bounds: values equal to a bound are kept.
    Bounds(f64, f64),
    ZScore { mean: f64, sigma: f64, k: f64 },
}

impl Rule {
    fn flags(&self, v: f64) -> bool {
        match *self {
            Rule::Bounds(lo, hi) => v < lo || v > hi,
            Rule::ZScore { mean, sigma, k } => ((v - mean) / sigma).abs() > k,
        }
    }
}

fn screen_column(
    values: &[Option<f64>],
    valid: &[f64],
    timestamps: &[Option<DateTime<Utc>>],
    row_offset: usize,
    config: &OutlierConfig,
) -> Option<ColumnOutliers> {
    let k = config.threshold;
    let rule = match config.method {
        OutlierMethod::Iqr => {
            let (lo, hi) = iqr_bounds(&sorted_copy(valid), k)?;
            Rule::Bounds(lo, hi)
        }
        OutlierMethod::ZScore => {
            let m = mean(valid)?;
            let sigma = population_std(valid)?;
            if sigma <= 0.0 {
                return None;
            }
            Rule::ZScore { mean: m, sigma, k }
        }
    };
    let (lower, upper) = match rule {
        Rule::Bounds(lo, hi) => (Some(lo), Some(hi)),
        Rule::ZScore { .. } => (None, None),
    };

    let mut found = ColumnOutliers {
        count: 0,
        percentage: 0.0,
        indices: Vec::new(),
        values: Vec::new(),
        timestamps: Vec::new(),
        method: config.method,
        threshold: k,
        lower_bound: lower,
        upper_bound: upper,
    };
    for (idx, value) in values.iter().enumerate() {
        let Some(v) = value else { continue };
        if rule.flags(*v) {
            found.indices.push(row_offset + idx);
            found.values.push(*v);
            found.timestamps.push(timestamps.get(idx).copied().flatten());
        }
    }
    found.count = found.indices.len();
    found.percentage = found.count as f64 / valid.len() as f64 * 100.0;
    Some(found)
}
