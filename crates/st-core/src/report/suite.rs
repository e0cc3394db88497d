//! The set of analyses a report is built from.

use st_config::ThresholdConfig;

use crate::alarms::{Alarm, ThresholdEvaluator};
use crate::analysis::{
    calculate_statistics, detect_outliers, fit_temperature_trend, OrbitAnalysis, OrbitAnalyzer,
    OutlierReport, StatisticsReport, TrendFit,
};
use crate::model::EnrichedTable;
use crate::settings::AnalysisSettings;

use super::stage::StageError;

/// Analyses run for the whole table and for every cycle.
///
/// Reports call each method through [`super::stage::run_stage`], so an
/// implementation may return an error (or panic) without taking the other
/// sections down with it.
pub trait AnalysisSuite {
    fn statistics(&self, table: &EnrichedTable) -> Result<StatisticsReport, StageError>;
    fn trend(&self, table: &EnrichedTable) -> Result<Option<TrendFit>, StageError>;
    fn outliers(&self, table: &EnrichedTable) -> Result<OutlierReport, StageError>;
    fn orbit(&self, table: &EnrichedTable) -> Result<OrbitAnalysis, StageError>;
    fn alarms(&self, table: &EnrichedTable) -> Result<Vec<Alarm>, StageError>;
}

/// The production analyses, configured once per run.
#[derive(Debug, Clone)]
pub struct StandardSuite {
    settings: AnalysisSettings,
    evaluator: ThresholdEvaluator,
    orbit: OrbitAnalyzer,
}

impl StandardSuite {
    pub fn new(settings: AnalysisSettings, thresholds: &ThresholdConfig) -> Self {
        Self {
            settings,
            evaluator: ThresholdEvaluator::new(thresholds),
            orbit: OrbitAnalyzer::new(settings.constants),
        }
    }
}

impl AnalysisSuite for StandardSuite {
    fn statistics(&self, table: &EnrichedTable) -> Result<StatisticsReport, StageError> {
        Ok(calculate_statistics(table))
    }

    fn trend(&self, table: &EnrichedTable) -> Result<Option<TrendFit>, StageError> {
        Ok(fit_temperature_trend(table, &self.settings.trend))
    }

    fn outliers(&self, table: &EnrichedTable) -> Result<OutlierReport, StageError> {
        Ok(detect_outliers(table, &self.settings.outliers))
    }

    fn orbit(&self, table: &EnrichedTable) -> Result<OrbitAnalysis, StageError> {
        Ok(self.orbit.analyze(table))
    }

    fn alarms(&self, table: &EnrichedTable) -> Result<Vec<Alarm>, StageError> {
        Ok(self.evaluator.evaluate(table))
    }
}
