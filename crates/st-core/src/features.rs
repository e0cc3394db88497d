//! Derived telemetry features.
//!
//! Adds orbit geometry (altitude, Kepler period), per-second change rates for
//! temperature and battery voltage, and calendar fields to every canonical
//! row. Physical constants are supplied by the caller.

use chrono::{Datelike, Timelike};
use st_common::PhysicalConstants;
use tracing::debug;

use crate::model::{
    CanonicalTable, DerivedFeatures, EnrichedSample, EnrichedTable, TelemetrySample,
};

/// Hours at or after this are night.
const NIGHT_START_HOUR: u32 = 18;
/// Hours at or before this are night.
const NIGHT_END_HOUR: u32 = 6;

/// Computes [`DerivedFeatures`] for a canonical table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDeriver {
    constants: PhysicalConstants,
}

impl FeatureDeriver {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    /// Enrich every row; row order is preserved.
    pub fn derive(&self, table: &CanonicalTable) -> EnrichedTable {
        let samples = table.samples();
        let rows: Vec<EnrichedSample> = samples
            .iter()
            .enumerate()
            .map(|(idx, sample)| {
                let prev = idx.checked_sub(1).map(|p| &samples[p]);
                EnrichedSample {
                    sample: sample.clone(),
                    derived: self.derive_row(prev, sample),
                }
            })
            .collect();
        debug!(rows = rows.len(), "derived telemetry features");
        EnrichedTable::new(rows)
    }

    fn derive_row(&self, prev: Option<&TelemetrySample>, cur: &TelemetrySample) -> DerivedFeatures {
        let hour = cur.timestamp.map(|t| t.hour());
        DerivedFeatures {
            altitude: cur.a.map(|a| self.constants.altitude_km(a)),
            orbit_period: cur.a.and_then(|a| self.constants.orbit_period_secs(a)),
            temp_change_rate: change_rate(prev, cur, |s| s.temperature),
            voltage_change_rate: change_rate(prev, cur, |s| s.battery_voltage),
            hour,
            minute: cur.timestamp.map(|t| t.minute()),
            day_of_week: cur.timestamp.map(|t| t.weekday().num_days_from_monday()),
            is_night: hour.map(|h| h >= NIGHT_START_HOUR || h <= NIGHT_END_HOUR),
        }
    }
}

/// Change per second between consecutive rows.
///
/// Zero for the first row, when either value or timestamp is missing, or
/// when the rows share a timestamp.
fn change_rate(
    prev: Option<&TelemetrySample>,
    cur: &TelemetrySample,
    field: impl Fn(&TelemetrySample) -> Option<f64>,
) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };
    let (Some(t0), Some(t1)) = (prev.timestamp, cur.timestamp) else {
        return 0.0;
    };
    let (Some(v0), Some(v1)) = (field(prev), field(cur)) else {
        return 0.0;
    };
    let dt = (t1 - t0).num_milliseconds() as f64 / 1000.0;
    if dt == 0.0 {
        return 0.0;
    }
    let rate = (v1 - v0) / dt;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}
