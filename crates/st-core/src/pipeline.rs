//! End-to-end batch pipeline: raw tables to reports.
//!
//! normalize → derive features → (statistics, trend, outliers, orbit,
//! alarms) per table and per cycle → summary. The threshold configuration
//! and settings are fixed for the whole run.

use st_common::Result;
use st_config::ThresholdConfig;
use tracing::{info, info_span};

use crate::alarms::Alarm;
use crate::features::FeatureDeriver;
use crate::input::RawTable;
use crate::model::{CanonicalTable, EnrichedTable};
use crate::normalize::{NormalizationReport, Normalizer};
use crate::report::{CycleReport, ReportAggregator, StandardSuite, SummaryReport};
use crate::settings::AnalysisSettings;

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub normalization: Vec<NormalizationReport>,
    pub table: EnrichedTable,
    pub alarms: Vec<Alarm>,
    pub cycles: Vec<CycleReport>,
    pub summary: SummaryReport,
}

/// A configured analysis pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    normalizer: Normalizer,
    deriver: FeatureDeriver,
    aggregator: ReportAggregator<StandardSuite>,
}

impl Pipeline {
    /// Build a pipeline; fails only on invalid settings.
    pub fn new(settings: AnalysisSettings, thresholds: &ThresholdConfig) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            normalizer: Normalizer::default(),
            deriver: FeatureDeriver::new(settings.constants),
            aggregator: ReportAggregator::new(
                StandardSuite::new(settings, thresholds),
                settings.cycle_size,
            ),
        })
    }

    /// Run over raw source tables.
    pub fn run(&self, raws: &[RawTable]) -> PipelineOutput {
        let _span = info_span!("pipeline", sources = raws.len()).entered();
        let normalized = self.normalizer.normalize_batch(raws);
        let mut output = self.run_table(&normalized.table);
        output.normalization = normalized.reports;
        output
    }

    /// Run over an already-normalized table.
    pub fn run_table(&self, table: &CanonicalTable) -> PipelineOutput {
        let enriched = self.deriver.derive(table);
        let report = self.aggregator.full_report(&enriched);
        info!(
            records = enriched.len(),
            alarms = report.alarms.len(),
            "pipeline finished"
        );
        PipelineOutput {
            normalization: Vec::new(),
            table: enriched,
            alarms: report.alarms,
            cycles: report.cycles,
            summary: report.summary,
        }
    }
}
