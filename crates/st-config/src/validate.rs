//! Semantic validation of threshold configurations.

use st_common::OrbitalElement;

use crate::thresholds::{BandThresholds, ThresholdConfig};

/// A semantic problem in an otherwise well-formed configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{category}.{band} must be finite, got {value}")]
    NonFinite {
        category: String,
        band: &'static str,
        value: f64,
    },

    #[error("{category}: {lower_name} ({lower}) exceeds {upper_name} ({upper})")]
    Inverted {
        category: String,
        lower_name: &'static str,
        lower: f64,
        upper_name: &'static str,
        upper: f64,
    },
}

/// Check that every configured value is finite and every min/max pair is ordered.
pub fn validate_thresholds(config: &ThresholdConfig) -> Result<(), ValidationError> {
    if let Some(bands) = &config.temperature {
        validate_bands("temperature", bands)?;
    }
    if let Some(bands) = &config.battery_voltage {
        validate_bands("battery_voltage", bands)?;
    }
    if let Some(orbit) = &config.orbit_parameters {
        for element in OrbitalElement::ALL {
            let Some(bounds) = orbit.get(element) else {
                continue;
            };
            let category = format!("orbit_parameters.{element}");
            check_finite(&category, "min", bounds.min)?;
            check_finite(&category, "max", bounds.max)?;
            check_order(&category, ("min", bounds.min), ("max", bounds.max))?;
        }
    }
    Ok(())
}

fn validate_bands(category: &str, bands: &BandThresholds) -> Result<(), ValidationError> {
    check_finite(category, "alarm_max", bands.alarm_max)?;
    check_finite(category, "alarm_min", bands.alarm_min)?;
    check_finite(category, "warning_max", bands.warning_max)?;
    check_finite(category, "warning_min", bands.warning_min)?;
    check_order(
        category,
        ("alarm_min", bands.alarm_min),
        ("alarm_max", bands.alarm_max),
    )?;
    check_order(
        category,
        ("warning_min", bands.warning_min),
        ("warning_max", bands.warning_max),
    )
}

fn check_finite(
    category: &str,
    band: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::NonFinite {
            category: category.to_string(),
            band,
            value: v,
        }),
        _ => Ok(()),
    }
}

fn check_order(
    category: &str,
    lower: (&'static str, Option<f64>),
    upper: (&'static str, Option<f64>),
) -> Result<(), ValidationError> {
    match (lower.1, upper.1) {
        (Some(lo), Some(hi)) if lo > hi => Err(ValidationError::Inverted {
            category: category.to_string(),
            lower_name: lower.0,
            lower: lo,
            upper_name: upper.0,
            upper: hi,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{ElementBounds, OrbitThresholds};

    #[test]
    fn default_config_is_valid() {
        assert!(validate_thresholds(&ThresholdConfig::default()).is_ok());
        assert!(validate_thresholds(&ThresholdConfig::empty()).is_ok());
    }

    #[test]
    fn rejects_nan_band() {
        let cfg = ThresholdConfig {
            battery_voltage: Some(BandThresholds {
                warning_min: Some(f64::NAN),
                ..Default::default()
            }),
            ..ThresholdConfig::empty()
        };
        let err = validate_thresholds(&cfg).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { band: "warning_min", .. }));
    }

    #[test]
    fn rejects_inverted_orbit_bounds() {
        let mut orbit = OrbitThresholds::default();
        orbit.set(
            OrbitalElement::I,
            ElementBounds::new(Some(99.0), Some(97.0)),
        );
        let cfg = ThresholdConfig {
            orbit_parameters: Some(orbit),
            ..ThresholdConfig::empty()
        };
        let err = validate_thresholds(&cfg).unwrap_err();
        assert!(err.to_string().contains("orbit_parameters.i"));
    }

    #[test]
    fn half_open_pairs_are_accepted() {
        let cfg = ThresholdConfig {
            temperature: Some(BandThresholds {
                alarm_min: Some(100.0),
                ..Default::default()
            }),
            ..ThresholdConfig::empty()
        };
        assert!(validate_thresholds(&cfg).is_ok());
    }
}
