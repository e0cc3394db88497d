//! Fixed-size reporting cycles.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::alarms::Alarm;
use crate::analysis::{StatisticsReport, TrendDirection};
use crate::model::{EnrichedTable, NumericColumn, TimeRange};

use super::stage::{run_stage, Stage};
use super::suite::AnalysisSuite;

/// At most this many alarms are listed in a cycle report.
pub const CYCLE_ALARM_LIMIT: usize = 5;
/// A cycle needs more rows than this before a trend is fitted.
pub const CYCLE_TREND_MIN_ROWS: usize = 3;

/// Split `len` rows into consecutive ranges of `size` rows; the last range
/// holds the remainder.
pub fn partition_cycles(len: usize, size: usize) -> Vec<Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

/// 1-based inclusive row span of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub first: usize,
    pub last: usize,
}

impl std::fmt::Display for RowSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleTrend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
}

/// Report for one cycle of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle_number: usize,
    pub rows: RowSpan,
    pub record_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    pub statistics: StatisticsReport,
    pub key_metrics: BTreeMap<NumericColumn, KeyMetric>,
    pub alarm_count: usize,
    /// The first few alarms of the cycle.
    pub alarms: Vec<Alarm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_trend: Option<CycleTrend>,
    pub outlier_count: usize,
    pub summary_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_stages: Vec<Stage>,
}

/// Build the report for rows `range` of `table`.
pub fn build_cycle<S: AnalysisSuite>(
    suite: &S,
    table: &EnrichedTable,
    cycle_number: usize,
    range: Range<usize>,
) -> CycleReport {
    let slice = table.slice(range);
    let mut failed = Vec::new();

    let (statistics, status) = run_stage(
        Stage::Statistics,
        || suite.statistics(&slice),
        StatisticsReport::is_empty,
    );
    if status.is_failed() {
        failed.push(Stage::Statistics);
    }

    let (alarms, status) = run_stage(Stage::Alarms, || suite.alarms(&slice), Vec::is_empty);
    if status.is_failed() {
        failed.push(Stage::Alarms);
    }

    let temperature_trend = if slice.len() > CYCLE_TREND_MIN_ROWS {
        let (fit, status) = run_stage(Stage::Trend, || suite.trend(&slice), Option::is_none);
        if status.is_failed() {
            failed.push(Stage::Trend);
        }
        fit.map(|f| CycleTrend {
            direction: f.direction,
            slope: f.slope,
            r_squared: f.r_squared,
        })
    } else {
        None
    };

    let (outliers, status) = run_stage(
        Stage::Outliers,
        || suite.outliers(&slice),
        |r| r.is_empty(),
    );
    if status.is_failed() {
        failed.push(Stage::Outliers);
    }

    let key_metrics: BTreeMap<NumericColumn, KeyMetric> = NumericColumn::KEY_PARAMETERS
        .iter()
        .filter_map(|c| {
            statistics.get(*c).map(|s| {
                (
                    *c,
                    KeyMetric {
                        mean: s.mean,
                        min: s.min,
                        max: s.max,
                        std: s.std,
                    },
                )
            })
        })
        .collect();

    let first = slice.row_offset() + 1;
    let mut report = CycleReport {
        cycle_number,
        rows: RowSpan {
            first,
            last: first + slice.len().saturating_sub(1),
        },
        record_count: slice.len(),
        time_range: slice.time_range(),
        statistics,
        key_metrics,
        alarm_count: alarms.len(),
        alarms: alarms.into_iter().take(CYCLE_ALARM_LIMIT).collect(),
        temperature_trend,
        outlier_count: outliers.total(),
        summary_text: String::new(),
        failed_stages: failed,
    };
    report.summary_text = cycle_summary_text(&report);
    report
}

/// Short human-readable summary of a cycle.
pub fn cycle_summary_text(report: &CycleReport) -> String {
    let mut lines = vec![
        format!("Cycle {} report", report.cycle_number),
        format!("Rows: {} ({} records)", report.rows, report.record_count),
    ];
    if let Some(range) = &report.time_range {
        lines.push(format!(
            "Time range: {} to {}",
            range.start.to_rfc3339(),
            range.end.to_rfc3339()
        ));
    }
    if let Some(t) = report.key_metrics.get(&NumericColumn::Temperature) {
        lines.push(format!(
            "Mean temperature: {:.2} °C (range {:.2} to {:.2} °C)",
            t.mean, t.min, t.max
        ));
    }
    if let Some(v) = report.key_metrics.get(&NumericColumn::BatteryVoltage) {
        lines.push(format!(
            "Mean battery voltage: {:.2} V (range {:.2} to {:.2} V)",
            v.mean, v.min, v.max
        ));
    }
    if let Some(trend) = &report.temperature_trend {
        lines.push(format!("Temperature trend: {}", trend.direction));
    }
    lines.push(format!("Alarms: {}", report.alarm_count));
    lines.push(format!("Outliers: {}", report.outlier_count));
    lines.join("\n")
}
