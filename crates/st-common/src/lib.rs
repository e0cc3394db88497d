//! Satellite telemetry common types, schema and errors.
//!
//! This crate provides foundational types shared across st-core modules:
//! - Canonical telemetry schema (columns, orbital elements)
//! - Physical constants used by orbit-derived features
//! - Common error types
//! - Output format specifications

pub mod constants;
pub mod error;
pub mod output;
pub mod schema;

pub use constants::PhysicalConstants;
pub use error::{Error, Result};
pub use output::OutputFormat;
pub use schema::{Column, OrbitalElement, SCHEMA_VERSION};
