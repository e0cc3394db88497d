//! Canonical and enriched telemetry tables.
//!
//! A [`CanonicalTable`] holds exactly the nine canonical columns, ordered by
//! timestamp with missing timestamps last. Feature derivation turns it into an
//! [`EnrichedTable`], which every analysis reads without mutating.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use st_common::{Column, OrbitalElement};

/// One telemetry record in the canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub a: Option<f64>,
    pub e: Option<f64>,
    pub i: Option<f64>,
    pub raan: Option<f64>,
    pub argp: Option<f64>,
    pub mean_anomaly: Option<f64>,
}

impl TelemetrySample {
    /// Numeric value of a canonical column (`None` for the timestamp column).
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Timestamp => None,
            Column::Temperature => self.temperature,
            Column::BatteryVoltage => self.battery_voltage,
            Column::A => self.a,
            Column::E => self.e,
            Column::I => self.i,
            Column::Raan => self.raan,
            Column::Argp => self.argp,
            Column::MeanAnomaly => self.mean_anomaly,
        }
    }

    pub fn set_value(&mut self, column: Column, value: Option<f64>) {
        let slot = match column {
            Column::Timestamp => return,
            Column::Temperature => &mut self.temperature,
            Column::BatteryVoltage => &mut self.battery_voltage,
            Column::A => &mut self.a,
            Column::E => &mut self.e,
            Column::I => &mut self.i,
            Column::Raan => &mut self.raan,
            Column::Argp => &mut self.argp,
            Column::MeanAnomaly => &mut self.mean_anomaly,
        };
        *slot = value;
    }

    pub fn element(&self, element: OrbitalElement) -> Option<f64> {
        self.value(element.column())
    }
}

/// Stable ascending sort by timestamp; rows without a timestamp go last.
pub(crate) fn sort_by_timestamp(samples: &mut [TelemetrySample]) {
    samples.sort_by_key(|s| (s.timestamp.is_none(), s.timestamp));
}

/// Telemetry in the canonical schema, ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTable {
    samples: Vec<TelemetrySample>,
}

impl CanonicalTable {
    /// Build a table from samples, sorting them by timestamp (missing last).
    pub fn from_samples(mut samples: Vec<TelemetrySample>) -> Self {
        sort_by_timestamp(&mut samples);
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Number of rows where `column` has no value.
    pub fn missing_count(&self, column: Column) -> usize {
        match column {
            Column::Timestamp => self.samples.iter().filter(|s| s.timestamp.is_none()).count(),
            c => self.samples.iter().filter(|s| s.value(c).is_none()).count(),
        }
    }
}

/// Features computed from one canonical row (and its predecessor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Altitude above the mean Earth radius (km).
    pub altitude: Option<f64>,
    /// Kepler period (s).
    pub orbit_period: Option<f64>,
    /// Temperature change per second since the previous row.
    pub temp_change_rate: f64,
    /// Battery voltage change per second since the previous row.
    pub voltage_change_rate: f64,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    /// Day of week, Monday = 0.
    pub day_of_week: Option<u32>,
    pub is_night: Option<bool>,
}

/// A canonical row together with its derived features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSample {
    #[serde(flatten)]
    pub sample: TelemetrySample,
    #[serde(flatten)]
    pub derived: DerivedFeatures,
}

impl EnrichedSample {
    pub fn value(&self, column: NumericColumn) -> Option<f64> {
        let d = &self.derived;
        match column {
            NumericColumn::Temperature => self.sample.temperature,
            NumericColumn::BatteryVoltage => self.sample.battery_voltage,
            NumericColumn::A => self.sample.a,
            NumericColumn::E => self.sample.e,
            NumericColumn::I => self.sample.i,
            NumericColumn::Raan => self.sample.raan,
            NumericColumn::Argp => self.sample.argp,
            NumericColumn::MeanAnomaly => self.sample.mean_anomaly,
            NumericColumn::Altitude => d.altitude,
            NumericColumn::OrbitPeriod => d.orbit_period,
            NumericColumn::TempChangeRate => Some(d.temp_change_rate),
            NumericColumn::VoltageChangeRate => Some(d.voltage_change_rate),
            NumericColumn::Hour => d.hour.map(f64::from),
            NumericColumn::Minute => d.minute.map(f64::from),
            NumericColumn::DayOfWeek => d.day_of_week.map(f64::from),
            NumericColumn::IsNight => d.is_night.map(|n| if n { 1.0 } else { 0.0 }),
        }
    }
}

/// Every numeric column of an enriched table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Temperature,
    BatteryVoltage,
    A,
    E,
    I,
    Raan,
    Argp,
    MeanAnomaly,
    Altitude,
    OrbitPeriod,
    TempChangeRate,
    VoltageChangeRate,
    Hour,
    Minute,
    DayOfWeek,
    IsNight,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 16] = [
        NumericColumn::Temperature,
        NumericColumn::BatteryVoltage,
        NumericColumn::A,
        NumericColumn::E,
        NumericColumn::I,
        NumericColumn::Raan,
        NumericColumn::Argp,
        NumericColumn::MeanAnomaly,
        NumericColumn::Altitude,
        NumericColumn::OrbitPeriod,
        NumericColumn::TempChangeRate,
        NumericColumn::VoltageChangeRate,
        NumericColumn::Hour,
        NumericColumn::Minute,
        NumericColumn::DayOfWeek,
        NumericColumn::IsNight,
    ];

    /// Parameters highlighted in cycle and summary reports.
    pub const KEY_PARAMETERS: [NumericColumn; 5] = [
        NumericColumn::Temperature,
        NumericColumn::BatteryVoltage,
        NumericColumn::A,
        NumericColumn::E,
        NumericColumn::I,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Temperature => "temperature",
            NumericColumn::BatteryVoltage => "battery_voltage",
            NumericColumn::A => "a",
            NumericColumn::E => "e",
            NumericColumn::I => "i",
            NumericColumn::Raan => "raan",
            NumericColumn::Argp => "argp",
            NumericColumn::MeanAnomaly => "mean_anomaly",
            NumericColumn::Altitude => "altitude",
            NumericColumn::OrbitPeriod => "orbit_period",
            NumericColumn::TempChangeRate => "temp_change_rate",
            NumericColumn::VoltageChangeRate => "voltage_change_rate",
            NumericColumn::Hour => "hour",
            NumericColumn::Minute => "minute",
            NumericColumn::DayOfWeek => "day_of_week",
            NumericColumn::IsNight => "is_night",
        }
    }

    pub fn from_element(element: OrbitalElement) -> Self {
        match element {
            OrbitalElement::A => NumericColumn::A,
            OrbitalElement::E => NumericColumn::E,
            OrbitalElement::I => NumericColumn::I,
            OrbitalElement::Raan => NumericColumn::Raan,
            OrbitalElement::Argp => NumericColumn::Argp,
            OrbitalElement::MeanAnomaly => NumericColumn::MeanAnomaly,
        }
    }
}

impl std::fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Inclusive time span covered by a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_secs() / 3600.0
    }
}

/// Enriched telemetry: canonical rows plus derived features.
///
/// A table produced by [`EnrichedTable::slice`] remembers where its first row
/// sits in the table it was cut from, so row indices reported by analyses on
/// a slice refer to the full table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTable {
    rows: Vec<EnrichedSample>,
    row_offset: usize,
}

impl EnrichedTable {
    pub fn new(rows: Vec<EnrichedSample>) -> Self {
        Self {
            rows,
            row_offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[EnrichedSample] {
        &self.rows
    }

    /// Index of this table's first row in the table it was sliced from.
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Contiguous sub-table over `range` (clamped to the table length).
    pub fn slice(&self, range: Range<usize>) -> EnrichedTable {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        EnrichedTable {
            rows: self.rows[start..end].to_vec(),
            row_offset: self.row_offset + start,
        }
    }

    /// Column values in row order, `None` where missing.
    pub fn column(&self, column: NumericColumn) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value(column)).collect()
    }

    /// Present values of a column in row order.
    pub fn valid(&self, column: NumericColumn) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.value(column)).collect()
    }

    pub fn timestamps(&self) -> Vec<Option<DateTime<Utc>>> {
        self.rows.iter().map(|r| r.sample.timestamp).collect()
    }

    /// Earliest and latest present timestamps.
    pub fn time_range(&self) -> Option<TimeRange> {
        let mut present = self.rows.iter().filter_map(|r| r.sample.timestamp);
        let first = present.next()?;
        let (start, end) = present.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(TimeRange { start, end })
    }
}
