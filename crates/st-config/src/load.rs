//! Loading threshold configuration from disk.
//!
//! The file format is chosen from the extension; files without a recognised
//! extension are read as YAML. Every successful load is validated before it
//! is handed back, so a returned [`ThresholdConfig`] is always usable.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::thresholds::ThresholdConfig;
use crate::validate::{validate_thresholds, ValidationError};

/// Errors that can occur while loading a threshold configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON parse error in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("TOML parse error in {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid thresholds in {origin}: {source}")]
    Invalid {
        origin: String,
        #[source]
        source: ValidationError,
    },
}

impl From<ConfigError> for st_common::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Invalid { .. } => st_common::Error::InvalidThresholds(e.to_string()),
            other => st_common::Error::Config(other.to_string()),
        }
    }
}

/// Serialization format of a threshold file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension (YAML when unknown).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Yaml => write!(f, "yaml"),
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Parse and validate a threshold configuration from text.
///
/// `origin` names the source in error messages (a path or `"<inline>"`).
pub fn parse_thresholds(
    text: &str,
    format: ConfigFormat,
    origin: &str,
) -> Result<ThresholdConfig, ConfigError> {
    let config: ThresholdConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            origin: origin.to_string(),
            source,
        })?,
        ConfigFormat::Json => serde_json::from_str(text).map_err(|source| ConfigError::Json {
            origin: origin.to_string(),
            source,
        })?,
        ConfigFormat::Toml => toml::from_str(text).map_err(|source| ConfigError::Toml {
            origin: origin.to_string(),
            source,
        })?,
    };

    validate_thresholds(&config).map_err(|source| ConfigError::Invalid {
        origin: origin.to_string(),
        source,
    })?;

    debug!(
        %origin,
        %format,
        temperature = config.temperature_bands().is_some(),
        battery_voltage = config.battery_voltage_bands().is_some(),
        orbit_parameters = config.orbit_bounds().is_some(),
        "threshold configuration parsed"
    );
    Ok(config)
}

/// Load a threshold configuration file.
pub fn load_thresholds(path: &Path) -> Result<ThresholdConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_thresholds(
        &text,
        ConfigFormat::from_path(path),
        &path.display().to_string(),
    )?;
    info!(path = %path.display(), "loaded threshold configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_common::OrbitalElement;
    use std::io::Write;

    const YAML: &str = r#"
temperature:
  alarm_max: 42.0
  warning_max: 39.0
battery_voltage:
  alarm_min: 6.8
orbit_parameters:
  a:
    min: 6700.0
    max: 7200.0
  e:
    max: 0.02
"#;

    #[test]
    fn parses_yaml_with_partial_bands() {
        let cfg = parse_thresholds(YAML, ConfigFormat::Yaml, "<inline>").unwrap();
        let temp = cfg.temperature_bands().unwrap();
        assert_eq!(temp.alarm_max, Some(42.0));
        assert_eq!(temp.alarm_min, None);
        let orbit = cfg.orbit_bounds().unwrap();
        assert_eq!(orbit.get(OrbitalElement::A).unwrap().min, Some(6700.0));
        assert_eq!(orbit.get(OrbitalElement::E).unwrap().min, None);
        assert!(orbit.get(OrbitalElement::I).is_none());
    }

    #[test]
    fn parses_json_and_toml() {
        let json = r#"{"temperature": {"alarm_max": 41.0}}"#;
        let cfg = parse_thresholds(json, ConfigFormat::Json, "<inline>").unwrap();
        assert_eq!(cfg.temperature_bands().unwrap().alarm_max, Some(41.0));
        assert!(cfg.battery_voltage_bands().is_none());

        let toml_text = "[battery_voltage]\nalarm_max = 8.5\nwarning_max = 8.3\n";
        let cfg = parse_thresholds(toml_text, ConfigFormat::Toml, "<inline>").unwrap();
        assert_eq!(cfg.battery_voltage_bands().unwrap().alarm_max, Some(8.5));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = parse_thresholds("temperature: [1, 2", ConfigFormat::Yaml, "bad.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        let common: st_common::Error = err.into();
        assert_eq!(common.code(), 10);
    }

    #[test]
    fn inverted_bands_fail_validation() {
        let text = "temperature:\n  alarm_min: 50.0\n  alarm_max: 40.0\n";
        let err = parse_thresholds(text, ConfigFormat::Yaml, "<inline>").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let common: st_common::Error = err.into();
        assert_eq!(common.code(), 11);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_thresholds(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn loads_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(br#"{"battery_voltage": {"warning_min": 7.4}}"#)
            .unwrap();
        let cfg = load_thresholds(&path).unwrap();
        assert_eq!(cfg.battery_voltage_bands().unwrap().warning_min, Some(7.4));
    }

    #[test]
    fn format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("t.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("t.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("t.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("thresholds")), ConfigFormat::Yaml);
    }
}
