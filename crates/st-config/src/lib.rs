//! Satellite telemetry threshold configuration.
//!
//! This crate provides:
//! - Typed Rust structs for the threshold file (temperature, battery voltage,
//!   orbital element bounds)
//! - The single table of fallback band values consulted by the evaluator
//! - Loading from YAML, JSON or TOML
//! - Config resolution (CLI → env → built-in defaults)
//! - Semantic validation

pub mod load;
pub mod resolve;
pub mod thresholds;
pub mod validate;

pub use load::{load_thresholds, parse_thresholds, ConfigError, ConfigFormat};
pub use resolve::{resolve_thresholds, ResolvedThresholds, ThresholdSource, THRESHOLDS_ENV};
pub use thresholds::{
    default_thresholds, BandThresholds, DefaultThresholds, ElementBounds, OrbitThresholds,
    ResolvedBands, ThresholdConfig,
};
pub use validate::{validate_thresholds, ValidationError};

/// Schema version for threshold configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// JSON Schema describing the threshold file layout.
pub fn threshold_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ThresholdConfig)).unwrap_or_default()
}
