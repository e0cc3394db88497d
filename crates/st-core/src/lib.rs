//! Satellite telemetry analysis core.
//!
//! Loads telemetry tables, normalizes them to the canonical schema, derives
//! orbital and temporal features, runs the statistics, trend, outlier, orbit
//! and threshold analyses, and aggregates the results into cycle and summary
//! reports.

pub mod alarms;
pub mod analysis;
pub mod cli;
pub mod exit_codes;
pub mod export;
pub mod features;
pub mod input;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod settings;

pub use alarms::{Alarm, AlarmParameter, Severity, ThresholdEvaluator};
pub use exit_codes::ExitCode;
pub use features::FeatureDeriver;
pub use input::RawTable;
pub use model::{CanonicalTable, EnrichedTable, NumericColumn, TelemetrySample};
pub use normalize::{NormalizationReport, Normalizer};
pub use pipeline::{Pipeline, PipelineOutput};
pub use render::{renderer_for, ReportRenderer, ReportView};
pub use report::{CycleReport, ReportAggregator, StandardSuite, SummaryReport};
pub use settings::AnalysisSettings;
