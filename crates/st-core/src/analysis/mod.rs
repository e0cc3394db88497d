//! Read-only analyses over an enriched telemetry table.

pub mod orbit;
pub mod outliers;
pub mod statistics;
pub mod trend;

pub use orbit::{OrbitAnalysis, OrbitAnalyzer, Stability};
pub use outliers::{detect_outliers, OutlierConfig, OutlierMethod, OutlierReport};
pub use statistics::{calculate_statistics, ColumnStatistics, StatisticsReport};
pub use trend::{classify_slope, fit_temperature_trend, fit_trend, TrendConfig, TrendDirection, TrendFit};
