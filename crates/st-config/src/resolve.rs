//! Threshold configuration resolution: CLI path → environment → built-in defaults.
//!
//! A path that was asked for (on the command line or through the environment)
//! must load; falling back silently would evaluate alarms against bands the
//! operator never chose.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::load::{load_thresholds, ConfigError};
use crate::thresholds::ThresholdConfig;

/// Environment variable naming a threshold file.
pub const THRESHOLDS_ENV: &str = "ST_THRESHOLDS";

/// Where the active threshold configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ThresholdSource {
    Cli(PathBuf),
    Environment(PathBuf),
    BuiltIn,
}

impl std::fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdSource::Cli(p) => write!(f, "cli:{}", p.display()),
            ThresholdSource::Environment(p) => write!(f, "env:{}", p.display()),
            ThresholdSource::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

/// A loaded configuration together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedThresholds {
    pub config: ThresholdConfig,
    pub source: ThresholdSource,
}

/// Resolve the threshold configuration for one evaluation pass.
pub fn resolve_thresholds(cli_path: Option<&Path>) -> Result<ResolvedThresholds, ConfigError> {
    resolve_with_env(cli_path, std::env::var_os(THRESHOLDS_ENV))
}

fn resolve_with_env(
    cli_path: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<ResolvedThresholds, ConfigError> {
    let source = match (cli_path, env_value) {
        (Some(path), _) => ThresholdSource::Cli(path.to_path_buf()),
        (None, Some(value)) if !value.is_empty() => {
            ThresholdSource::Environment(PathBuf::from(value))
        }
        _ => ThresholdSource::BuiltIn,
    };

    let config = match &source {
        ThresholdSource::Cli(path) | ThresholdSource::Environment(path) => {
            load_thresholds(path)?
        }
        ThresholdSource::BuiltIn => ThresholdConfig::default(),
    };
    info!(%source, "threshold configuration resolved");
    Ok(ResolvedThresholds { config, source })
}
