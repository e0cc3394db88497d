//! Canonical telemetry schema and report versioning.

use serde::{Deserialize, Serialize};

/// Current schema version for all JSON outputs.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Check if a schema version is compatible with current.
pub fn is_compatible(version: &str) -> bool {
    let major = |v: &str| {
        v.split('.')
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0)
    };
    major(SCHEMA_VERSION) == major(version)
}

/// A column of the canonical input table, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Timestamp,
    Temperature,
    BatteryVoltage,
    A,
    E,
    I,
    Raan,
    Argp,
    MeanAnomaly,
}

impl Column {
    /// All canonical columns in their fixed output order.
    pub const ALL: [Column; 9] = [
        Column::Timestamp,
        Column::Temperature,
        Column::BatteryVoltage,
        Column::A,
        Column::E,
        Column::I,
        Column::Raan,
        Column::Argp,
        Column::MeanAnomaly,
    ];

    /// Canonical column name as it appears in the expected schema.
    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Temperature => "temperature",
            Column::BatteryVoltage => "battery_voltage",
            Column::A => "a",
            Column::E => "e",
            Column::I => "i",
            Column::Raan => "raan",
            Column::Argp => "argp",
            Column::MeanAnomaly => "mean_anomaly",
        }
    }

    /// Look up a column by its exact canonical name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// The orbital element this column carries, if any.
    pub fn orbital_element(self) -> Option<OrbitalElement> {
        OrbitalElement::ALL
            .iter()
            .copied()
            .find(|e| e.column() == self)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the six classical orbital elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitalElement {
    /// Semi-major axis (km).
    A,
    /// Eccentricity.
    E,
    /// Inclination (deg).
    I,
    /// Right ascension of the ascending node (deg).
    Raan,
    /// Argument of perigee (deg).
    Argp,
    /// Mean anomaly (deg).
    MeanAnomaly,
}

impl OrbitalElement {
    pub const ALL: [OrbitalElement; 6] = [
        OrbitalElement::A,
        OrbitalElement::E,
        OrbitalElement::I,
        OrbitalElement::Raan,
        OrbitalElement::Argp,
        OrbitalElement::MeanAnomaly,
    ];

    pub fn column(self) -> Column {
        match self {
            OrbitalElement::A => Column::A,
            OrbitalElement::E => Column::E,
            OrbitalElement::I => Column::I,
            OrbitalElement::Raan => Column::Raan,
            OrbitalElement::Argp => Column::Argp,
            OrbitalElement::MeanAnomaly => Column::MeanAnomaly,
        }
    }

    pub fn name(self) -> &'static str {
        self.column().name()
    }
}

impl std::fmt::Display for OrbitalElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_major_compatible() {
        assert!(is_compatible("1.0.0"));
        assert!(is_compatible("1.4.2"));
    }

    #[test]
    fn test_different_major_incompatible() {
        assert!(!is_compatible("0.9.0"));
        assert!(!is_compatible("2.0.0"));
    }

    #[test]
    fn canonical_order_is_fixed() {
        let names: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "timestamp",
                "temperature",
                "battery_voltage",
                "a",
                "e",
                "i",
                "raan",
                "argp",
                "mean_anomaly"
            ]
        );
    }

    #[test]
    fn orbital_elements_map_to_columns() {
        for element in OrbitalElement::ALL {
            assert_eq!(element.column().orbital_element(), Some(element));
        }
        assert_eq!(Column::Temperature.orbital_element(), None);
        assert_eq!(Column::from_name("raan"), Some(Column::Raan));
        assert_eq!(Column::from_name("RAAN"), None);
    }
}
