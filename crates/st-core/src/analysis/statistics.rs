//! Descriptive statistics over every numeric column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use st_math::{sample_std, summarize, CorrelatedPair, CorrelationMatrix};

use crate::model::{EnrichedTable, NumericColumn};

/// Correlations stronger than this (in magnitude) are listed separately.
pub const STRONG_CORRELATION: f64 = 0.7;

/// Statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
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
    pub missing: usize,
    pub missing_percentage: f64,
}

/// Spacing between consecutive timestamps, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStatistics {
    pub count: usize,
    pub mean_secs: f64,
    pub std_secs: Option<f64>,
    pub min_secs: f64,
    pub max_secs: f64,
}

/// Statistics for a table or cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub columns: BTreeMap<NumericColumn, ColumnStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_intervals: Option<IntervalStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    pub strong_correlations: Vec<CorrelatedPair>,
}

impl StatisticsReport {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: NumericColumn) -> Option<&ColumnStatistics> {
        self.columns.get(&column)
    }
}

/// Compute statistics for every numeric column with at least one value.
///
/// An empty table yields an empty report.
pub fn calculate_statistics(table: &EnrichedTable) -> StatisticsReport {
    let mut report = StatisticsReport::default();
    if table.is_empty() {
        return report;
    }

    let rows = table.len();
    let mut present: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for column in NumericColumn::ALL {
        let values = table.column(column);
        let valid: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(s) = summarize(&valid) else {
            continue;
        };
        let missing = rows - valid.len();
        report.columns.insert(
            column,
            ColumnStatistics {
                count: s.count,
                mean: s.mean,
                std: s.std,
                min: s.min,
                q1: s.q1,
                median: s.median,
                q3: s.q3,
                max: s.max,
                range: s.range,
                variance: s.variance,
                skewness: s.skewness,
                kurtosis: s.kurtosis,
                missing,
                missing_percentage: missing as f64 / rows as f64 * 100.0,
            },
        );
        present.push((column.name().to_string(), values));
    }

    report.time_intervals = time_intervals(table);

    if present.len() >= 2 {
        let matrix = CorrelationMatrix::compute(&present);
        report.strong_correlations = matrix.strong_pairs(STRONG_CORRELATION);
        report.correlation = Some(matrix);
    }
    report
}

fn time_intervals(table: &EnrichedTable) -> Option<IntervalStatistics> {
    let ts = table.timestamps();
    let gaps: Vec<f64> = ts
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) => Some((b - a).num_milliseconds() as f64 / 1000.0),
            _ => None,
        })
        .collect();
    let s = summarize(&gaps)?;
    Some(IntervalStatistics {
        count: s.count,
        mean_secs: s.mean,
        std_secs: sample_std(&gaps),
        min_secs: s.min,
        max_secs: s.max,
    })
}
