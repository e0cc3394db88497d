//! Report rendering.
//!
//! Renderers turn pipeline output into text for one [`ReportView`]. JSON is
//! the machine-readable contract; the text form is for people. CSV flattens
//! the JSON envelope into `key,value` rows for spreadsheets.

mod csv;
mod json;
mod text;

use serde::Serialize;
use st_common::{OutputFormat, Result};

use crate::pipeline::PipelineOutput;

pub use csv::{flatten, key_value_csv, CsvRenderer};
pub use json::JsonRenderer;
pub use text::TextRenderer;

/// Which part of the output to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportView {
    /// Whole-dataset summary plus normalization reports.
    Summary,
    /// One entry per cycle.
    Cycles,
    /// Every alarm in time order.
    Alarms,
}

pub trait ReportRenderer {
    fn render(&self, output: &PipelineOutput, view: ReportView) -> Result<String>;
}

/// The renderer for an output format.
pub fn renderer_for(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer),
    }
}
