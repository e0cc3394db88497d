//! Analysis settings shared by every stage of a run.

use serde::{Deserialize, Serialize};
use st_common::{Error, PhysicalConstants, Result};

use crate::analysis::{OutlierConfig, TrendConfig};

/// Default number of rows per reporting cycle.
pub const DEFAULT_CYCLE_SIZE: usize = 10;

/// Tunables for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Rows per reporting cycle.
    pub cycle_size: usize,
    pub trend: TrendConfig,
    pub outliers: OutlierConfig,
    pub constants: PhysicalConstants,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cycle_size: DEFAULT_CYCLE_SIZE,
            trend: TrendConfig::default(),
            outliers: OutlierConfig::default(),
            constants: PhysicalConstants::default(),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        if self.cycle_size == 0 {
            return Err(Error::Config("cycle size must be at least 1".to_string()));
        }
        if !self.outliers.threshold.is_finite() || self.outliers.threshold <= 0.0 {
            return Err(Error::Config(format!(
                "outlier threshold must be a positive number, got {}",
                self.outliers.threshold
            )));
        }
        if !self.trend.dead_band.is_finite() || self.trend.dead_band < 0.0 {
            return Err(Error::Config(format!(
                "trend dead band must be a non-negative number, got {}",
                self.trend.dead_band
            )));
        }
        Ok(())
    }
}
