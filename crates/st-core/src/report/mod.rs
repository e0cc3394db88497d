//! Cycle and summary report aggregation.
//!
//! [`ReportAggregator`] runs an [`AnalysisSuite`] over the whole table and
//! over each fixed-size cycle. Every stage is isolated; see [`stage`].

pub mod cycle;
pub mod recommend;
pub mod stage;
pub mod suite;
pub mod summary;

use std::collections::BTreeMap;

use tracing::{info, info_span};

use crate::alarms::Alarm;
use crate::model::EnrichedTable;

pub use cycle::{build_cycle, partition_cycles, CycleReport, CycleTrend, KeyMetric, RowSpan};
pub use recommend::{recommendations, RecommendationInputs};
pub use stage::{run_stage, Stage, StageError, StageStatus};
pub use suite::{AnalysisSuite, StandardSuite};
pub use summary::{
    compose_summary, data_overview, AlarmSummary, ALARM_DETAIL_LIMIT, CycleSummary, DataOverview, OrbitSummary,
    ParameterSummary, SummaryInputs, SummaryReport, TrendSummary,
};

/// Everything a run reports.
#[derive(Debug, Clone)]
pub struct FullReport {
    pub alarms: Vec<Alarm>,
    pub cycles: Vec<CycleReport>,
    pub summary: SummaryReport,
}

/// Builds cycle and summary reports from an analysis suite.
#[derive(Debug, Clone)]
pub struct ReportAggregator<S> {
    suite: S,
    cycle_size: usize,
}

impl<S: AnalysisSuite> ReportAggregator<S> {
    pub fn new(suite: S, cycle_size: usize) -> Self {
        Self {
            suite,
            cycle_size: cycle_size.max(1),
        }
    }

    /// One report per `cycle_size` rows, numbered from 1.
    pub fn cycle_reports(&self, table: &EnrichedTable) -> Vec<CycleReport> {
        let _span = info_span!("cycles", rows = table.len(), cycle_size = self.cycle_size).entered();
        partition_cycles(table.len(), self.cycle_size)
            .into_iter()
            .enumerate()
            .map(|(idx, range)| build_cycle(&self.suite, table, idx + 1, range))
            .collect()
    }

    /// Run every stage once over the whole table plus the cycle partition.
    pub fn full_report(&self, table: &EnrichedTable) -> FullReport {
        let _span = info_span!("report", rows = table.len()).entered();
        let mut stages = BTreeMap::new();

        let (statistics, status) = run_stage(
            Stage::Statistics,
            || self.suite.statistics(table),
            |s| s.is_empty(),
        );
        stages.insert(Stage::Statistics, status);

        let (trend, status) = run_stage(Stage::Trend, || self.suite.trend(table), Option::is_none);
        stages.insert(Stage::Trend, status);

        let (outliers, status) = run_stage(
            Stage::Outliers,
            || self.suite.outliers(table),
            |o| o.is_empty(),
        );
        stages.insert(Stage::Outliers, status);

        let (orbit, status) = run_stage(Stage::Orbit, || self.suite.orbit(table), |o| o.is_empty());
        stages.insert(Stage::Orbit, status);

        let (alarms, status) = run_stage(Stage::Alarms, || self.suite.alarms(table), Vec::is_empty);
        stages.insert(Stage::Alarms, status);

        let (cycles, status) = run_stage(
            Stage::Cycles,
            || Ok(self.cycle_reports(table)),
            Vec::is_empty,
        );
        stages.insert(Stage::Cycles, status);

        let failed = |stage: Stage| stages.get(&stage).is_some_and(StageStatus::is_failed);
        let inputs = SummaryInputs {
            statistics: (!failed(Stage::Statistics)).then_some(&statistics),
            trend: trend.as_ref(),
            outliers: (!failed(Stage::Outliers)).then_some(&outliers),
            orbit: (!failed(Stage::Orbit)).then_some(&orbit),
            alarms: &alarms,
            cycles: &cycles,
        };
        let summary = compose_summary(table, &inputs, stages.clone());
        info!(
            records = table.len(),
            alarms = alarms.len(),
            cycles = cycles.len(),
            "report complete"
        );

        FullReport {
            alarms,
            cycles,
            summary,
        }
    }
}
