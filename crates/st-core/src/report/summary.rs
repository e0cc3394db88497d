//! Whole-dataset summary report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use st_common::{Column, OrbitalElement, SCHEMA_VERSION};
use st_math::CorrelatedPair;

use crate::alarms::{Alarm, Severity};
use crate::analysis::orbit::{relative_dispersion_stability, ELEMENT_STABILITY_THRESHOLD};
use crate::analysis::outliers::OutlierSummary;
use crate::analysis::{
    OrbitAnalysis, OutlierReport, Stability, StatisticsReport, TrendDirection, TrendFit,
};
use crate::model::{EnrichedTable, NumericColumn};

use super::cycle::CycleReport;
use super::recommend::{recommendations, RecommendationInputs};
use super::stage::{Stage, StageStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataOverview {
    pub total_records: usize,
    /// Canonical columns followed by derived columns.
    pub columns: Vec<String>,
    /// Numeric columns holding at least one value.
    pub numeric_columns: Vec<NumericColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    pub current_value: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitSummary {
    pub parameters_analyzed: Vec<OrbitalElement>,
    pub stability: Stability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_period_minutes: Option<f64>,
    pub strong_correlations: usize,
}

impl Default for OrbitSummary {
    fn default() -> Self {
        Self {
            parameters_analyzed: Vec::new(),
            stability: Stability::Undetermined,
            mean_period_minutes: None,
            strong_correlations: 0,
        }
    }
}

/// Number of alarms listed in full in [`AlarmSummary::first_alarms`].
pub const ALARM_DETAIL_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlarmSummary {
    pub total_alarms: usize,
    pub by_parameter: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    /// The earliest alarms in evaluation order.
    pub first_alarms: Vec<Alarm>,
}

impl AlarmSummary {
    pub fn from_alarms(alarms: &[Alarm]) -> Self {
        let mut summary = AlarmSummary {
            total_alarms: alarms.len(),
            first_alarms: alarms.iter().take(ALARM_DETAIL_LIMIT).cloned().collect(),
            ..Default::default()
        };
        for alarm in alarms {
            *summary
                .by_parameter
                .entry(alarm.parameter.to_string())
                .or_default() += 1;
            *summary.by_severity.entry(alarm.severity).or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub total_cycles: usize,
    pub average_records_per_cycle: f64,
    pub cycles_with_alarms: usize,
}

impl CycleSummary {
    pub fn from_cycles(cycles: &[CycleReport]) -> Self {
        if cycles.is_empty() {
            return Self::default();
        }
        let records: usize = cycles.iter().map(|c| c.record_count).sum();
        Self {
            total_cycles: cycles.len(),
            average_records_per_cycle: records as f64 / cycles.len() as f64,
            cycles_with_alarms: cycles.iter().filter(|c| c.alarm_count > 0).count(),
        }
    }
}

/// Aggregate report over the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub schema_version: String,
    pub data_overview: DataOverview,
    pub statistics_summary: BTreeMap<NumericColumn, ParameterSummary>,
    pub strong_correlations: Vec<CorrelatedPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_summary: Option<TrendSummary>,
    pub outlier_summary: OutlierSummary,
    pub orbit_summary: OrbitSummary,
    pub alarm_summary: AlarmSummary,
    pub cycle_summary: CycleSummary,
    pub recommendations: Vec<String>,
    /// Outcome of every stage; failed stages leave their section empty.
    pub stages: BTreeMap<Stage, StageStatus>,
}

/// Stage results a summary is composed from.
#[derive(Debug, Clone, Default)]
pub struct SummaryInputs<'a> {
    pub statistics: Option<&'a StatisticsReport>,
    pub trend: Option<&'a TrendFit>,
    pub outliers: Option<&'a OutlierReport>,
    pub orbit: Option<&'a OrbitAnalysis>,
    pub alarms: &'a [Alarm],
    pub cycles: &'a [CycleReport],
}

pub fn data_overview(table: &EnrichedTable) -> DataOverview {
    let columns = Column::ALL
        .iter()
        .map(|c| c.name().to_string())
        .chain(
            NumericColumn::ALL
                .iter()
                .skip(Column::ALL.len() - 1)
                .map(|c| c.name().to_string()),
        )
        .collect();
    let numeric_columns = NumericColumn::ALL
        .iter()
        .copied()
        .filter(|c| table.rows().iter().any(|r| r.value(*c).is_some()))
        .collect();
    DataOverview {
        total_records: table.len(),
        columns,
        numeric_columns,
        time_range: table.time_range().map(|r| TimeSpan {
            start: r.start,
            end: r.end,
            duration_hours: r.duration_hours(),
        }),
    }
}

/// Compose the summary from stage results.
pub fn compose_summary(
    table: &EnrichedTable,
    inputs: &SummaryInputs<'_>,
    stages: BTreeMap<Stage, StageStatus>,
) -> SummaryReport {
    let statistics_summary: BTreeMap<NumericColumn, ParameterSummary> = inputs
        .statistics
        .map(|stats| {
            NumericColumn::KEY_PARAMETERS
                .iter()
                .filter_map(|c| {
                    let s = stats.get(*c)?;
                    Some((
                        *c,
                        ParameterSummary {
                            mean: s.mean,
                            min: s.min,
                            max: s.max,
                            std: s.std,
                            stability: relative_dispersion_stability(
                                s.std,
                                s.mean,
                                ELEMENT_STABILITY_THRESHOLD,
                            ),
                        },
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    let trend_summary = inputs.trend.map(|t| TrendSummary {
        direction: t.direction,
        slope: t.slope,
        r_squared: t.r_squared,
        current_value: t.current_value,
        interpretation: t.interpretation.clone(),
    });

    let outlier_summary = inputs
        .outliers
        .map(|o| o.summary.clone())
        .unwrap_or_default();

    let orbit_summary = inputs
        .orbit
        .filter(|o| !o.is_empty())
        .map(|o| OrbitSummary {
            parameters_analyzed: o.elements.keys().copied().collect(),
            stability: o.stability(),
            mean_period_minutes: o.orbit_period.as_ref().map(|p| p.mean_minutes),
            strong_correlations: o.strong_correlations.len(),
        })
        .unwrap_or_default();

    let alarm_summary = AlarmSummary::from_alarms(inputs.alarms);
    let cycle_summary = CycleSummary::from_cycles(inputs.cycles);

    let recs = recommendations(&RecommendationInputs {
        records: table.len(),
        alarms: alarm_summary.total_alarms,
        temperature_std: statistics_summary
            .get(&NumericColumn::Temperature)
            .and_then(|p| p.std),
        battery_min: statistics_summary
            .get(&NumericColumn::BatteryVoltage)
            .map(|p| p.min),
        orbit_stability: orbit_summary.stability,
        outliers: outlier_summary.total_outliers,
    });

    SummaryReport {
        schema_version: SCHEMA_VERSION.to_string(),
        data_overview: data_overview(table),
        statistics_summary,
        strong_correlations: inputs
            .statistics
            .map(|s| s.strong_correlations.clone())
            .unwrap_or_default(),
        trend_summary,
        outlier_summary,
        orbit_summary,
        alarm_summary,
        cycle_summary,
        recommendations: recs,
        stages,
    }
}
