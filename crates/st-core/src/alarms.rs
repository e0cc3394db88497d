//! Threshold evaluation.
//!
//! Temperature and battery voltage use four bands with a fixed priority:
//! `alarm_max`, `alarm_min`, `warning_max`, `warning_min`. The first band a
//! value violates is the only one reported for that row. Orbital elements
//! have alarm-tier `min`/`max` bounds, checked `min` first. Missing values
//! never raise anything.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use st_common::OrbitalElement;
use st_config::{default_thresholds, BandThresholds, DefaultThresholds, ResolvedBands, ThresholdConfig};
use tracing::{debug, trace, warn};

use crate::model::EnrichedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Alarm,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Alarm => write!(f, "alarm"),
        }
    }
}

/// The monitored quantity an alarm refers to.
///
/// Serialized as `temperature`, `battery_voltage` or `orbit_<element>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlarmParameter {
    Temperature,
    BatteryVoltage,
    Orbit(OrbitalElement),
}

impl std::fmt::Display for AlarmParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlarmParameter::Temperature => write!(f, "temperature"),
            AlarmParameter::BatteryVoltage => write!(f, "battery_voltage"),
            AlarmParameter::Orbit(e) => write!(f, "orbit_{e}"),
        }
    }
}

impl FromStr for AlarmParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(AlarmParameter::Temperature),
            "battery_voltage" => Ok(AlarmParameter::BatteryVoltage),
            other => other
                .strip_prefix("orbit_")
                .and_then(|name| OrbitalElement::ALL.into_iter().find(|e| e.name() == name))
                .map(AlarmParameter::Orbit)
                .ok_or_else(|| format!("unknown alarm parameter: {other}")),
        }
    }
}

impl Serialize for AlarmParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlarmParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One threshold violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub timestamp: Option<DateTime<Utc>>,
    pub parameter: AlarmParameter,
    pub severity: Severity,
    pub value: f64,
    pub message: String,
}

/// Which band a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    AlarmMax,
    AlarmMin,
    WarningMax,
    WarningMin,
}

impl Band {
    pub fn severity(self) -> Severity {
        match self {
            Band::AlarmMax | Band::AlarmMin => Severity::Alarm,
            Band::WarningMax | Band::WarningMin => Severity::Warning,
        }
    }
}

/// The highest-priority band `value` violates, if any.
pub fn classify_band(value: f64, bands: &ResolvedBands) -> Option<(Band, f64)> {
    if value > bands.alarm_max {
        Some((Band::AlarmMax, bands.alarm_max))
    } else if value < bands.alarm_min {
        Some((Band::AlarmMin, bands.alarm_min))
    } else if value > bands.warning_max {
        Some((Band::WarningMax, bands.warning_max))
    } else if value < bands.warning_min {
        Some((Band::WarningMin, bands.warning_min))
    } else {
        None
    }
}

/// Evaluates a table against one threshold configuration.
#[derive(Debug, Clone)]
pub struct ThresholdEvaluator {
    config: ThresholdConfig,
    defaults: DefaultThresholds,
}

impl ThresholdEvaluator {
    pub fn new(config: &ThresholdConfig) -> Self {
        let evaluator = Self {
            config: config.clone(),
            defaults: default_thresholds(),
        };
        for category in evaluator.skipped_categories() {
            warn!(category, "no thresholds configured; skipping checks");
        }
        evaluator
    }

    /// Threshold categories absent from the configuration.
    pub fn skipped_categories(&self) -> Vec<&'static str> {
        let mut skipped = Vec::new();
        if self.config.temperature_bands().is_none() {
            skipped.push("temperature");
        }
        if self.config.battery_voltage_bands().is_none() {
            skipped.push("battery_voltage");
        }
        if self.config.orbit_bounds().is_none() {
            skipped.push("orbit_parameters");
        }
        skipped
    }

    /// All alarms for a table, ordered by timestamp (missing last). Within a
    /// timestamp the order is temperature, battery voltage, orbit, then row.
    pub fn evaluate(&self, table: &EnrichedTable) -> Vec<Alarm> {
        let temperature = self.check_temperature(table);
        let battery_voltage = self.check_battery_voltage(table);
        let orbit = self.check_orbit_parameters(table);
        debug!(
            temperature = temperature.len(),
            battery_voltage = battery_voltage.len(),
            orbit = orbit.len(),
            rows = table.len(),
            "threshold evaluation complete"
        );

        let mut alarms = temperature;
        alarms.extend(battery_voltage);
        alarms.extend(orbit);
        alarms.sort_by_key(|a| (a.timestamp.is_none(), a.timestamp));
        alarms
    }

    pub fn check_temperature(&self, table: &EnrichedTable) -> Vec<Alarm> {
        let Some(bands) = self.config.temperature_bands() else {
            trace!("temperature checks skipped");
            return Vec::new();
        };
        check_bands(
            table,
            AlarmParameter::Temperature,
            bands,
            &self.defaults.temperature,
            "°C",
            |row| row.sample.temperature,
        )
    }

    pub fn check_battery_voltage(&self, table: &EnrichedTable) -> Vec<Alarm> {
        let Some(bands) = self.config.battery_voltage_bands() else {
            trace!("battery voltage checks skipped");
            return Vec::new();
        };
        check_bands(
            table,
            AlarmParameter::BatteryVoltage,
            bands,
            &self.defaults.battery_voltage,
            "V",
            |row| row.sample.battery_voltage,
        )
    }

    pub fn check_orbit_parameters(&self, table: &EnrichedTable) -> Vec<Alarm> {
        let Some(orbit) = self.config.orbit_bounds() else {
            trace!("orbit parameter checks skipped");
            return Vec::new();
        };
        let mut alarms = Vec::new();
        for row in table.rows() {
            for element in OrbitalElement::ALL {
                let Some(bounds) = orbit.get(element) else {
                    continue;
                };
                let Some(value) = row.sample.element(element) else {
                    continue;
                };
                let violation = match (bounds.min, bounds.max) {
                    (Some(min), _) if value < min => Some(("below minimum", min)),
                    (_, Some(max)) if value > max => Some(("above maximum", max)),
                    _ => None,
                };
                if let Some((what, limit)) = violation {
                    alarms.push(Alarm {
                        timestamp: row.sample.timestamp,
                        parameter: AlarmParameter::Orbit(element),
                        severity: Severity::Alarm,
                        value,
                        message: format!("orbit parameter {element} {what}: {value} (limit {limit})"),
                    });
                }
            }
        }
        alarms
    }
}

fn check_bands(
    table: &EnrichedTable,
    parameter: AlarmParameter,
    configured: &BandThresholds,
    defaults: &ResolvedBands,
    unit: &str,
    value_of: impl Fn(&crate::model::EnrichedSample) -> Option<f64>,
) -> Vec<Alarm> {
    let bands = configured.resolve(defaults);
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let value = value_of(row)?;
            let (band, limit) = classify_band(value, &bands)?;
            Some(Alarm {
                timestamp: row.sample.timestamp,
                parameter,
                severity: band.severity(),
                value,
                message: band_message(parameter, band, value, limit, unit),
            })
        })
        .collect()
}

fn band_message(parameter: AlarmParameter, band: Band, value: f64, limit: f64, unit: &str) -> String {
    let label = match parameter {
        AlarmParameter::Temperature => "temperature",
        AlarmParameter::BatteryVoltage => "battery voltage",
        AlarmParameter::Orbit(_) => "orbit parameter",
    };
    let state = match band {
        Band::AlarmMax => "critically high",
        Band::AlarmMin => "critically low",
        Band::WarningMax => "high",
        Band::WarningMin => "low",
    };
    let side = match band {
        Band::AlarmMax => "above alarm limit",
        Band::AlarmMin => "below alarm limit",
        Band::WarningMax => "above warning limit",
        Band::WarningMin => "below warning limit",
    };
    format!("{label} {state}: {value:.2} {unit} ({side} {limit:.2} {unit})")
}
