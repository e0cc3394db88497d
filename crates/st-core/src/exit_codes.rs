//! Exit codes for the st-core CLI.
//!
//! Scripts can tell a clean run from one that raised alarms, and both from a
//! failure, without parsing the report.

use st_common::Error;

/// Exit codes for st-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report produced, no alarms
    Clean = 0,

    /// Report produced, at least one alarm raised
    AlarmsRaised = 1,

    /// Threshold file or settings rejected
    ConfigError = 10,

    /// Input missing or unreadable as telemetry
    InputError = 11,

    /// I/O error writing output
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates a produced report.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::AlarmsRaised)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Exit code for a finished report.
    pub fn for_alarm_count(alarms: usize) -> Self {
        if alarms == 0 {
            ExitCode::Clean
        } else {
            ExitCode::AlarmsRaised
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::InvalidThresholds(_) => ExitCode::ConfigError,
            Error::Input(_) | Error::NoInput(_) => ExitCode::InputError,
            Error::Io(_) => ExitCode::IoError,
            Error::Render(_) | Error::Json(_) => ExitCode::InternalError,
        }
    }
}
