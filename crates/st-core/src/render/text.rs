use std::fmt::{self, Write as _};

use st_common::{Error, Result};

use crate::alarms::Alarm;
use crate::normalize::NormalizationReport;
use crate::pipeline::PipelineOutput;
use crate::report::{CycleReport, StageStatus, SummaryReport};

use super::{ReportRenderer, ReportView};

/// Plain-text report for terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, output: &PipelineOutput, view: ReportView) -> Result<String> {
        let mut out = String::new();
        write_view(&mut out, output, view)
            .map_err(|e| Error::Render(format!("{view:?} view: {e}")))?;
        Ok(out)
    }
}

fn write_view(out: &mut String, output: &PipelineOutput, view: ReportView) -> fmt::Result {
    match view {
        ReportView::Summary => {
            write_normalization(out, &output.normalization)?;
            write_summary(out, &output.summary)
        }
        ReportView::Cycles => write_cycles(out, &output.cycles),
        ReportView::Alarms => write_alarms(out, &output.alarms),
    }
}

fn write_normalization(out: &mut String, reports: &[NormalizationReport]) -> fmt::Result {
    for r in reports {
        let repaired = !r.renamed.is_empty()
            || !r.dropped.is_empty()
            || r.timestamp_parse_failures > 0
            || r.value_parse_failures > 0
            || r.duplicate_timestamps_adjusted > 0;
        if !repaired {
            continue;
        }
        writeln!(out, "Input {}:", r.source.as_deref().unwrap_or("<inline>"))?;
        for rename in &r.renamed {
            writeln!(out, "  renamed {:?} -> {}", rename.from, rename.to)?;
        }
        if !r.dropped.is_empty() {
            writeln!(out, "  dropped columns: {}", r.dropped.join(", "))?;
        }
        if r.timestamp_parse_failures > 0 {
            writeln!(out, "  unparseable timestamps: {}", r.timestamp_parse_failures)?;
        }
        if r.value_parse_failures > 0 {
            writeln!(out, "  unparseable values: {}", r.value_parse_failures)?;
        }
        if r.duplicate_timestamps_adjusted > 0 {
            writeln!(
                out,
                "  duplicate timestamps offset: {}",
                r.duplicate_timestamps_adjusted
            )?;
        }
    }
    Ok(())
}

fn write_summary(out: &mut String, s: &SummaryReport) -> fmt::Result {
    writeln!(out, "=== Telemetry summary ===")?;
    let o = &s.data_overview;
    writeln!(out, "Records: {}", o.total_records)?;
    if let Some(range) = &o.time_range {
        writeln!(
            out,
            "Time range: {} to {} ({:.2} h)",
            range.start.to_rfc3339(),
            range.end.to_rfc3339(),
            range.duration_hours
        )?;
    }

    if !s.statistics_summary.is_empty() {
        writeln!(out, "\nKey parameters:")?;
        for (column, p) in &s.statistics_summary {
            let std = p.std.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
            writeln!(
                out,
                "  {column:<16} mean {:.4}  min {:.4}  max {:.4}  std {std}  ({})",
                p.mean, p.min, p.max, p.stability
            )?;
        }
    }

    if let Some(t) = &s.trend_summary {
        writeln!(out, "\nTemperature trend: {}", t.interpretation)?;
    }

    writeln!(
        out,
        "\nOutliers: {} in {} column(s)",
        s.outlier_summary.total_outliers,
        s.outlier_summary.columns_with_outliers.len()
    )?;

    let orbit = &s.orbit_summary;
    if !orbit.parameters_analyzed.is_empty() {
        write!(out, "Orbit: {}", orbit.stability)?;
        if let Some(minutes) = orbit.mean_period_minutes {
            write!(out, ", mean period {minutes:.2} min")?;
        }
        writeln!(out)?;
    }

    let alarms = &s.alarm_summary;
    writeln!(out, "Alarms: {}", alarms.total_alarms)?;
    for (parameter, count) in &alarms.by_parameter {
        writeln!(out, "  {parameter}: {count}")?;
    }
    if !alarms.first_alarms.is_empty() {
        writeln!(out, "  first {} of {}:", alarms.first_alarms.len(), alarms.total_alarms)?;
        for a in &alarms.first_alarms {
            write!(out, "    ")?;
            write_alarm_line(out, a)?;
        }
    }

    let c = &s.cycle_summary;
    writeln!(
        out,
        "Cycles: {} (avg {:.1} records, {} with alarms)",
        c.total_cycles, c.average_records_per_cycle, c.cycles_with_alarms
    )?;

    let failed: Vec<String> = s
        .stages
        .iter()
        .filter_map(|(stage, status)| match status {
            StageStatus::Failed { reason } => Some(format!("{stage} ({reason})")),
            _ => None,
        })
        .collect();
    if !failed.is_empty() {
        writeln!(out, "Failed stages: {}", failed.join("; "))?;
    }

    writeln!(out, "\nRecommendations:")?;
    for r in &s.recommendations {
        writeln!(out, "  - {r}")?;
    }
    Ok(())
}

fn write_cycles(out: &mut String, cycles: &[CycleReport]) -> fmt::Result {
    if cycles.is_empty() {
        return writeln!(out, "No cycles.");
    }
    for (idx, cycle) in cycles.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", cycle.summary_text)?;
    }
    Ok(())
}

fn write_alarms(out: &mut String, alarms: &[Alarm]) -> fmt::Result {
    if alarms.is_empty() {
        return writeln!(out, "No alarms.");
    }
    for a in alarms {
        write_alarm_line(out, a)?;
    }
    Ok(())
}

fn write_alarm_line(out: &mut String, a: &Alarm) -> fmt::Result {
    let when = a
        .timestamp
        .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
    writeln!(
        out,
        "{when}  {:<7}  {:<16}  {}",
        a.severity.to_string(),
        a.parameter.to_string(),
        a.message
    )
}
