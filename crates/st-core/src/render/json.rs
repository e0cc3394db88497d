use serde::Serialize;
use st_common::{Error, Result, SCHEMA_VERSION};

use crate::alarms::Alarm;
use crate::normalize::NormalizationReport;
use crate::pipeline::PipelineOutput;
use crate::report::{CycleReport, SummaryReport};

use super::{ReportRenderer, ReportView};

/// Pretty-printed JSON with a versioned envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

#[derive(Serialize)]
pub(super) struct Envelope<'a> {
    schema_version: &'static str,
    view: ReportView,
    records: usize,
    normalization: &'a [NormalizationReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a SummaryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycles: Option<&'a [CycleReport]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alarms: Option<&'a [Alarm]>,
}

impl<'a> Envelope<'a> {
    /// The envelope for one view of `output`.
    pub(super) fn new(output: &'a PipelineOutput, view: ReportView) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            view,
            records: output.table.len(),
            normalization: &output.normalization,
            summary: (view == ReportView::Summary).then_some(&output.summary),
            cycles: (view == ReportView::Cycles).then_some(output.cycles.as_slice()),
            alarms: (view == ReportView::Alarms).then_some(output.alarms.as_slice()),
        }
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, output: &PipelineOutput, view: ReportView) -> Result<String> {
        serde_json::to_string_pretty(&Envelope::new(output, view))
            .map_err(|e| Error::Render(format!("{view:?} view: {e}")))
    }
}
