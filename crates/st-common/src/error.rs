//! Error types for satellite telemetry analysis.

use thiserror::Error;

/// Result type alias for telemetry analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for telemetry analysis.
///
/// Only configuration, input and I/O problems stop a run. Failures inside an
/// analysis stage are absorbed by the report aggregator and surface as a
/// failed stage status instead.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid threshold configuration: {0}")]
    InvalidThresholds(String),

    // Input errors (20-29)
    #[error("input error: {0}")]
    Input(String),

    #[error("no telemetry input found at {0}")]
    NoInput(String),

    // Report errors (40-49)
    #[error("report rendering failed: {0}")]
    Render(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidThresholds(_) => 11,
            Error::Input(_) => 20,
            Error::NoInput(_) => 23,
            Error::Render(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
