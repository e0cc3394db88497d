//! Threshold configuration types.
//!
//! These types match the threshold file layout:
//!
//! ```yaml
//! temperature:     { alarm_max: 40.0, alarm_min: 15.0, warning_max: 38.0, warning_min: 20.0 }
//! battery_voltage: { alarm_max: 8.4,  alarm_min: 7.0,  warning_max: 8.2,  warning_min: 7.3 }
//! orbit_parameters:
//!   a: { min: 6771.0, max: 7171.0 }
//!   e: { max: 0.01 }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use st_common::OrbitalElement;

/// Complete threshold configuration.
///
/// An absent (or empty) category disables that category's checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThresholdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<BandThresholds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<BandThresholds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_parameters: Option<OrbitThresholds>,
}

impl Default for ThresholdConfig {
    /// Built-in configuration: both scalar categories carry every default
    /// band; orbital elements have no bounds.
    fn default() -> Self {
        let defaults = default_thresholds();
        Self {
            temperature: Some(BandThresholds::from(defaults.temperature)),
            battery_voltage: Some(BandThresholds::from(defaults.battery_voltage)),
            orbit_parameters: None,
        }
    }
}

impl ThresholdConfig {
    /// A configuration with every category absent.
    pub fn empty() -> Self {
        Self {
            temperature: None,
            battery_voltage: None,
            orbit_parameters: None,
        }
    }

    /// Temperature bands, treating an empty mapping as absent.
    pub fn temperature_bands(&self) -> Option<&BandThresholds> {
        self.temperature.as_ref().filter(|b| !b.is_empty())
    }

    /// Battery voltage bands, treating an empty mapping as absent.
    pub fn battery_voltage_bands(&self) -> Option<&BandThresholds> {
        self.battery_voltage.as_ref().filter(|b| !b.is_empty())
    }

    /// Orbital element bounds, treating an empty mapping as absent.
    pub fn orbit_bounds(&self) -> Option<&OrbitThresholds> {
        self.orbit_parameters.as_ref().filter(|o| !o.is_empty())
    }
}

/// Four-tier band values for a scalar housekeeping parameter.
///
/// Any band left out falls back to [`default_thresholds`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BandThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_min: Option<f64>,
}

impl BandThresholds {
    pub fn is_empty(&self) -> bool {
        self.alarm_max.is_none()
            && self.alarm_min.is_none()
            && self.warning_max.is_none()
            && self.warning_min.is_none()
    }

    /// Fill every missing band from `defaults`.
    pub fn resolve(&self, defaults: &ResolvedBands) -> ResolvedBands {
        ResolvedBands {
            alarm_max: self.alarm_max.unwrap_or(defaults.alarm_max),
            alarm_min: self.alarm_min.unwrap_or(defaults.alarm_min),
            warning_max: self.warning_max.unwrap_or(defaults.warning_max),
            warning_min: self.warning_min.unwrap_or(defaults.warning_min),
        }
    }
}

impl From<ResolvedBands> for BandThresholds {
    fn from(b: ResolvedBands) -> Self {
        Self {
            alarm_max: Some(b.alarm_max),
            alarm_min: Some(b.alarm_min),
            warning_max: Some(b.warning_max),
            warning_min: Some(b.warning_min),
        }
    }
}

/// Fully-populated band values used during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBands {
    pub alarm_max: f64,
    pub alarm_min: f64,
    pub warning_max: f64,
    pub warning_min: f64,
}

/// Alarm-tier bounds for a single orbital element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ElementBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ElementBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Per-element bounds. Elements without bounds are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OrbitThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<ElementBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<ElementBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<ElementBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raan: Option<ElementBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argp: Option<ElementBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_anomaly: Option<ElementBounds>,
}

impl OrbitThresholds {
    /// Bounds for `element`, or `None` when nothing is configured for it.
    pub fn get(&self, element: OrbitalElement) -> Option<&ElementBounds> {
        let slot = match element {
            OrbitalElement::A => &self.a,
            OrbitalElement::E => &self.e,
            OrbitalElement::I => &self.i,
            OrbitalElement::Raan => &self.raan,
            OrbitalElement::Argp => &self.argp,
            OrbitalElement::MeanAnomaly => &self.mean_anomaly,
        };
        slot.as_ref().filter(|b| !b.is_empty())
    }

    pub fn set(&mut self, element: OrbitalElement, bounds: ElementBounds) {
        let slot = match element {
            OrbitalElement::A => &mut self.a,
            OrbitalElement::E => &mut self.e,
            OrbitalElement::I => &mut self.i,
            OrbitalElement::Raan => &mut self.raan,
            OrbitalElement::Argp => &mut self.argp,
            OrbitalElement::MeanAnomaly => &mut self.mean_anomaly,
        };
        *slot = Some(bounds);
    }

    pub fn is_empty(&self) -> bool {
        OrbitalElement::ALL.iter().all(|e| self.get(*e).is_none())
    }
}

/// Fallback band values for each scalar category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultThresholds {
    pub temperature: ResolvedBands,
    pub battery_voltage: ResolvedBands,
}

/// The one table of fallback thresholds consulted by the evaluator.
pub const fn default_thresholds() -> DefaultThresholds {
    DefaultThresholds {
        // °C
        temperature: ResolvedBands {
            alarm_max: 40.0,
            alarm_min: 15.0,
            warning_max: 38.0,
            warning_min: 20.0,
        },
        // V
        battery_voltage: ResolvedBands {
            alarm_max: 8.4,
            alarm_min: 7.0,
            warning_max: 8.2,
            warning_min: 7.3,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_bands_fall_back_to_defaults() {
        let bands = BandThresholds {
            alarm_max: Some(45.0),
            ..Default::default()
        };
        let resolved = bands.resolve(&default_thresholds().temperature);
        assert_eq!(resolved.alarm_max, 45.0);
        assert_eq!(resolved.alarm_min, 15.0);
        assert_eq!(resolved.warning_max, 38.0);
        assert_eq!(resolved.warning_min, 20.0);
    }

    #[test]
    fn empty_category_counts_as_absent() {
        let cfg = ThresholdConfig {
            temperature: Some(BandThresholds::default()),
            battery_voltage: None,
            orbit_parameters: Some(OrbitThresholds::default()),
        };
        assert!(cfg.temperature_bands().is_none());
        assert!(cfg.battery_voltage_bands().is_none());
        assert!(cfg.orbit_bounds().is_none());
    }

    #[test]
    fn orbit_lookup_skips_unbounded_elements() {
        let mut orbit = OrbitThresholds::default();
        orbit.set(OrbitalElement::A, ElementBounds::new(Some(6700.0), Some(7200.0)));
        orbit.set(OrbitalElement::E, ElementBounds::default());
        assert!(orbit.get(OrbitalElement::A).is_some());
        assert!(orbit.get(OrbitalElement::E).is_none());
        assert!(orbit.get(OrbitalElement::I).is_none());
        assert!(!orbit.is_empty());
    }

    #[test]
    fn default_config_carries_every_band() {
        let cfg = ThresholdConfig::default();
        let temp = cfg.temperature_bands().unwrap();
        assert_eq!(temp.alarm_max, Some(40.0));
        assert_eq!(temp.warning_min, Some(20.0));
        let volt = cfg.battery_voltage_bands().unwrap();
        assert_eq!(volt.alarm_min, Some(7.0));
        assert_eq!(volt.warning_max, Some(8.2));
        assert!(cfg.orbit_bounds().is_none());
    }
}
