//! Rule-based recommendations for a summary report.

use crate::analysis::Stability;

/// Alarms above this share of records trigger a recommendation.
pub const ALARM_RATE_LIMIT: f64 = 0.1;
/// Temperature standard deviation above this (°C) triggers a recommendation.
pub const TEMPERATURE_STD_LIMIT: f64 = 5.0;
/// Minimum battery voltage below this (V) triggers a recommendation.
pub const BATTERY_MIN_LIMIT: f64 = 7.2;
/// More outliers than this trigger a recommendation.
pub const OUTLIER_COUNT_LIMIT: usize = 10;

/// Facts the recommendation rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationInputs {
    pub records: usize,
    pub alarms: usize,
    pub temperature_std: Option<f64>,
    pub battery_min: Option<f64>,
    pub orbit_stability: Stability,
    pub outliers: usize,
}

/// Apply the rules in order; when none fires, report that all is normal.
pub fn recommendations(inputs: &RecommendationInputs) -> Vec<String> {
    if inputs.records == 0 {
        return vec!["No telemetry records were available; nothing to assess.".to_string()];
    }

    let mut out = Vec::new();
    if inputs.alarms as f64 > inputs.records as f64 * ALARM_RATE_LIMIT {
        out.push(format!(
            "High alarm rate: {} alarms over {} records. Check sensor health and review the threshold settings.",
            inputs.alarms, inputs.records
        ));
    }
    if let Some(std) = inputs.temperature_std.filter(|s| *s > TEMPERATURE_STD_LIMIT) {
        out.push(format!(
            "Large temperature fluctuation (std {std:.2} °C). Inspect the thermal control system."
        ));
    }
    if let Some(min) = inputs.battery_min.filter(|v| *v < BATTERY_MIN_LIMIT) {
        out.push(format!(
            "Battery voltage fell to {min:.2} V. Inspect the power subsystem."
        ));
    }
    if inputs.orbit_stability == Stability::Unstable {
        out.push(
            "Semi-major axis is drifting. Consider planning an orbit maintenance manoeuvre."
                .to_string(),
        );
    }
    if inputs.outliers > OUTLIER_COUNT_LIMIT {
        out.push(format!(
            "{} outliers detected. Review data quality and the acquisition chain.",
            inputs.outliers
        ));
    }
    if out.is_empty() {
        out.push("All parameters normal; no action required.".to_string());
    }
    out
}
