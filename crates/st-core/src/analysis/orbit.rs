//! Orbital element stability, altitude drift, period and element correlation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use st_common::{OrbitalElement, PhysicalConstants};
use st_math::{mean, min_max, sample_std, CorrelationMatrix};

use crate::model::{EnrichedTable, NumericColumn};

/// Relative dispersion below which an element counts as stable.
pub const ELEMENT_STABILITY_THRESHOLD: f64 = 0.01;
/// Mean |da/dt| below which the orbit counts as stable (km/s).
pub const ALTITUDE_RATE_THRESHOLD: f64 = 0.1;
/// Element correlations stronger than this are reported.
pub const ELEMENT_CORRELATION_THRESHOLD: f64 = 0.8;

/// Means closer to zero than this make relative dispersion undefined.
const ZERO_MEAN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Unstable,
    Undetermined,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Stable => write!(f, "stable"),
            Stability::Unstable => write!(f, "unstable"),
            Stability::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// Stable when `std / |mean| < threshold`.
///
/// Undetermined when the spread is unknown or the mean is (near) zero.
pub fn relative_dispersion_stability(std: Option<f64>, mean: f64, threshold: f64) -> Stability {
    match std {
        Some(s) if mean.abs() > ZERO_MEAN => {
            if s / mean.abs() < threshold {
                Stability::Stable
            } else {
                Stability::Unstable
            }
        }
        _ => Stability::Undetermined,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub stability: Stability,
}

/// Drift of the semi-major axis between consecutive samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeRateStability {
    pub samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rate: Option<f64>,
    pub assessment: Stability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitPeriodStatistics {
    pub mean_secs: f64,
    pub std_secs: Option<f64>,
    pub min_secs: f64,
    pub max_secs: f64,
    pub mean_minutes: f64,
    pub mean_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCorrelation {
    pub first: OrbitalElement,
    pub second: OrbitalElement,
    pub correlation: f64,
    pub relationship: Relationship,
}

/// Orbit analysis of a table or cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitAnalysis {
    pub elements: BTreeMap<OrbitalElement, ElementStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_stability: Option<AltitudeRateStability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_period: Option<OrbitPeriodStatistics>,
    pub strong_correlations: Vec<ElementCorrelation>,
}

impl OrbitAnalysis {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Altitude-rate assessment, `Undetermined` when it could not be computed.
    pub fn stability(&self) -> Stability {
        self.orbit_stability
            .as_ref()
            .map_or(Stability::Undetermined, |s| s.assessment)
    }
}

/// Analyzes orbital elements with a fixed set of physical constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitAnalyzer {
    constants: PhysicalConstants,
}

impl OrbitAnalyzer {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn analyze(&self, table: &EnrichedTable) -> OrbitAnalysis {
        let mut analysis = OrbitAnalysis::default();

        for element in OrbitalElement::ALL {
            let values = table.valid(NumericColumn::from_element(element));
            if let Some(stats) = element_statistics(&values) {
                analysis.elements.insert(element, stats);
            }
        }

        let a_values = table.valid(NumericColumn::A);
        if !a_values.is_empty() {
            analysis.orbit_stability = Some(altitude_rate(table, &a_values));
            analysis.orbit_period = self.period_statistics(&a_values);
        }

        analysis.strong_correlations = element_correlations(table);
        analysis
    }

    fn period_statistics(&self, a_values: &[f64]) -> Option<OrbitPeriodStatistics> {
        let periods: Vec<f64> = a_values
            .iter()
            .filter_map(|a| self.constants.orbit_period_secs(*a))
            .collect();
        let mean_secs = mean(&periods)?;
        let (min_secs, max_secs) = min_max(&periods)?;
        Some(OrbitPeriodStatistics {
            mean_secs,
            std_secs: sample_std(&periods),
            min_secs,
            max_secs,
            mean_minutes: mean_secs / 60.0,
            mean_hours: mean_secs / 3600.0,
        })
    }
}

fn element_statistics(values: &[f64]) -> Option<ElementStatistics> {
    let m = mean(values)?;
    let (min, max) = min_max(values)?;
    let std = sample_std(values);
    Some(ElementStatistics {
        count: values.len(),
        mean: m,
        std,
        min,
        max,
        range: max - min,
        stability: relative_dispersion_stability(std, m, ELEMENT_STABILITY_THRESHOLD),
    })
}

/// Successive differences of the valid `a` values, divided position-wise by
/// successive timestamp gaps; both sequences are truncated to the shorter.
fn altitude_rate(table: &EnrichedTable, a_values: &[f64]) -> AltitudeRateStability {
    let a_diff: Vec<f64> = a_values.windows(2).map(|w| w[1] - w[0]).collect();
    let timestamps = table.timestamps();
    let dt: Vec<f64> = timestamps
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(t0), Some(t1)) => Some((t1 - t0).num_milliseconds() as f64 / 1000.0),
            _ => None,
        })
        .collect();

    let rates: Vec<f64> = a_diff
        .iter()
        .zip(&dt)
        .map(|(da, dt)| da / dt)
        .filter(|r| r.is_finite())
        .collect();

    let Some(mean_rate) = mean(&rates) else {
        return AltitudeRateStability {
            samples: 0,
            mean_rate: None,
            max_rate: None,
            min_rate: None,
            assessment: Stability::Undetermined,
        };
    };
    let (min_rate, max_rate) = min_max(&rates).unwrap_or((mean_rate, mean_rate));
    AltitudeRateStability {
        samples: rates.len(),
        mean_rate: Some(mean_rate),
        max_rate: Some(max_rate),
        min_rate: Some(min_rate),
        assessment: if mean_rate.abs() < ALTITUDE_RATE_THRESHOLD {
            Stability::Stable
        } else {
            Stability::Unstable
        },
    }
}

fn element_correlations(table: &EnrichedTable) -> Vec<ElementCorrelation> {
    let present: Vec<(OrbitalElement, Vec<Option<f64>>)> = OrbitalElement::ALL
        .iter()
        .map(|e| (*e, table.column(NumericColumn::from_element(*e))))
        .filter(|(_, values)| values.iter().any(Option::is_some))
        .collect();
    if present.len() < 2 {
        return Vec::new();
    }

    let labelled: Vec<(String, Vec<Option<f64>>)> = present
        .iter()
        .map(|(e, v)| (e.name().to_string(), v.clone()))
        .collect();
    let matrix = CorrelationMatrix::compute(&labelled);

    let mut out = Vec::new();
    for i in 0..present.len() {
        for j in (i + 1)..present.len() {
            let Some(r) = matrix.values[i][j] else {
                continue;
            };
            if r.abs() > ELEMENT_CORRELATION_THRESHOLD {
                out.push(ElementCorrelation {
                    first: present[i].0,
                    second: present[j].0,
                    correlation: r,
                    relationship: if r > 0.0 {
                        Relationship::Positive
                    } else {
                        Relationship::Negative
                    },
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrichedSample, TelemetrySample};
    use chrono::{Duration, TimeZone, Utc};

    fn orbit_table(a: &[Option<f64>], e: &[Option<f64>], step_secs: i64) -> EnrichedTable {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        EnrichedTable::new(
            a.iter()
                .zip(e)
                .enumerate()
                .map(|(idx, (a, e))| EnrichedSample {
                    sample: TelemetrySample {
                        timestamp: Some(start + Duration::seconds(step_secs * idx as i64)),
                        a: *a,
                        e: *e,
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn relative_dispersion_rules() {
        assert_eq!(relative_dispersion_stability(Some(1.0), 7000.0, 0.01), Stability::Stable);
        assert_eq!(relative_dispersion_stability(Some(100.0), 7000.0, 0.01), Stability::Unstable);
        assert_eq!(relative_dispersion_stability(Some(0.1), 0.0, 0.01), Stability::Undetermined);
        assert_eq!(relative_dispersion_stability(None, 7000.0, 0.01), Stability::Undetermined);
    }

    #[test]
    fn slowly_drifting_orbit_is_stable() {
        let a: Vec<_> = (0..10).map(|i| Some(7000.0 - 0.5 * i as f64)).collect();
        let e: Vec<_> = (0..10).map(|i| Some(0.001 + 0.0001 * i as f64)).collect();
        let analysis = OrbitAnalyzer::default().analyze(&orbit_table(&a, &e, 60));

        assert_eq!(analysis.elements[&OrbitalElement::A].stability, Stability::Stable);
        let rate = analysis.orbit_stability.as_ref().unwrap();
        assert_eq!(rate.samples, 9);
        assert!((rate.mean_rate.unwrap() + 0.5 / 60.0).abs() < 1e-12);
        assert_eq!(analysis.stability(), Stability::Stable);

        let period = analysis.orbit_period.as_ref().unwrap();
        assert!((period.mean_minutes * 60.0 - period.mean_secs).abs() < 1e-9);

        let corr = &analysis.strong_correlations[0];
        assert_eq!((corr.first, corr.second), (OrbitalElement::A, OrbitalElement::E));
        assert_eq!(corr.relationship, Relationship::Negative);
    }

    #[test]
    fn fast_drift_is_unstable() {
        let a: Vec<_> = (0..5).map(|i| Some(7000.0 - 10.0 * i as f64)).collect();
        let e = vec![None; 5];
        let analysis = OrbitAnalyzer::default().analyze(&orbit_table(&a, &e, 1));
        assert_eq!(analysis.stability(), Stability::Unstable);
        assert!(!analysis.elements.contains_key(&OrbitalElement::E));
    }

    #[test]
    fn zero_time_gaps_leave_stability_undetermined() {
        let a = vec![Some(7000.0), Some(7001.0), Some(7002.0)];
        let e = vec![None; 3];
        let analysis = OrbitAnalyzer::default().analyze(&orbit_table(&a, &e, 0));
        let rate = analysis.orbit_stability.as_ref().unwrap();
        assert_eq!(rate.samples, 0);
        assert_eq!(rate.assessment, Stability::Undetermined);
    }

    #[test]
    fn no_orbit_columns_gives_empty_analysis() {
        let analysis = OrbitAnalyzer::default().analyze(&orbit_table(&[None; 4], &[None; 4], 60));
        assert!(analysis.is_empty());
        assert!(analysis.orbit_stability.is_none());
        assert_eq!(analysis.stability(), Stability::Undetermined);
    }
}
