//! Per-stage failure isolation.
//!
//! Each analysis stage runs inside [`run_stage`]. An error or a panic in one
//! stage becomes an empty result plus a [`StageStatus::Failed`] entry; the
//! remaining stages still run.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// The analysis stages that feed a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Statistics,
    Trend,
    Outliers,
    Orbit,
    Alarms,
    Cycles,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Statistics => "statistics",
            Stage::Trend => "trend",
            Stage::Outliers => "outliers",
            Stage::Orbit => "orbit",
            Stage::Alarms => "alarms",
            Stage::Cycles => "cycles",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// Ran and produced a result.
    Succeeded,
    /// Ran but had nothing to report (too little data).
    Empty,
    /// Errored or panicked; the stage's section is empty.
    Failed { reason: String },
}

impl StageStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageStatus::Failed { .. })
    }
}

/// Error returned by an analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StageError(pub String);

/// Run `f` as `stage`, turning errors and panics into a default value.
///
/// `is_empty` decides between `Succeeded` and `Empty` for a successful run.
pub fn run_stage<T, F, E>(stage: Stage, f: F, is_empty: E) -> (T, StageStatus)
where
    T: Default,
    F: FnOnce() -> Result<T, StageError>,
    E: FnOnce(&T) -> bool,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => {
            let status = if is_empty(&value) {
                StageStatus::Empty
            } else {
                StageStatus::Succeeded
            };
            debug!(%stage, ?status, "stage finished");
            (value, status)
        }
        Ok(Err(e)) => {
            error!(%stage, error = %e, "analysis stage failed");
            (T::default(), StageStatus::Failed { reason: e.0 })
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(%stage, reason = %reason, "analysis stage panicked");
            (
                T::default(),
                StageStatus::Failed {
                    reason: format!("panic: {reason}"),
                },
            )
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
