//! Schema normalization: raw tables into the canonical telemetry table.
//!
//! Steps, per source table:
//! 1. clean and reconcile headers ([`columns`])
//! 2. synthesize missing columns (timestamps on a fixed one-minute grid,
//!    numeric columns as all-missing)
//! 3. parse cells leniently ([`timestamp`]), counting failures
//! 4. separate duplicate timestamps by a per-row millisecond offset
//! 5. stable-sort by timestamp, missing timestamps last
//!
//! Normalization never fails; every repair is recorded in a
//! [`NormalizationReport`].

pub mod columns;
pub mod timestamp;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use st_common::Column;
use tracing::{debug, warn};

use crate::input::RawTable;
use crate::model::{sort_by_timestamp, CanonicalTable, TelemetrySample};

pub use columns::{clean_header, reconcile, ColumnMapping, ColumnRename, MatchRule};
pub use timestamp::{parse_number, parse_timestamp, Cell};

/// Options for synthesized timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// First synthesized timestamp.
    pub synthetic_start: DateTime<Utc>,
    /// Spacing of synthesized timestamps.
    pub synthetic_step: Duration,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            synthetic_start: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            synthetic_step: Duration::minutes(1),
        }
    }
}

/// Everything normalization repaired in one source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub rows: usize,
    pub renamed: Vec<ColumnRename>,
    pub synthesized: Vec<Column>,
    pub dropped: Vec<String>,
    pub timestamp_parse_failures: usize,
    pub value_parse_failures: usize,
    /// Rows whose timestamp was shifted to break a tie.
    pub duplicate_timestamps_adjusted: usize,
    /// Missing cells per canonical column after normalization (non-zero only).
    pub missing_values: BTreeMap<Column, usize>,
}

/// A normalized table and the per-source reports that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub table: CanonicalTable,
    pub reports: Vec<NormalizationReport>,
}

/// Converts raw tables into the canonical schema.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Normalize one raw table.
    pub fn normalize(&self, raw: &RawTable) -> Normalized {
        let (samples, report) = self.normalize_rows(raw);
        Normalized {
            table: CanonicalTable::from_samples(samples),
            reports: vec![report],
        }
    }

    /// Normalize several raw tables and merge them into one table.
    ///
    /// Each source is normalized on its own (duplicate offsets use positions
    /// within that source); the concatenation is then stable-sorted.
    pub fn normalize_batch(&self, raws: &[RawTable]) -> Normalized {
        let mut all = Vec::new();
        let mut reports = Vec::with_capacity(raws.len());
        for raw in raws {
            let (samples, report) = self.normalize_rows(raw);
            all.extend(samples);
            reports.push(report);
        }
        debug!(sources = raws.len(), rows = all.len(), "merged telemetry sources");
        Normalized {
            table: CanonicalTable::from_samples(all),
            reports,
        }
    }

    fn normalize_rows(&self, raw: &RawTable) -> (Vec<TelemetrySample>, NormalizationReport) {
        let headers: Vec<String> = raw.headers.iter().map(|h| clean_header(h)).collect();
        let mapping = reconcile(&headers);

        let mut report = NormalizationReport {
            source: raw.source.clone(),
            rows: raw.len(),
            renamed: mapping.renamed.clone(),
            synthesized: mapping.unresolved(),
            dropped: mapping.dropped.clone(),
            ..Default::default()
        };
        for rename in &report.renamed {
            debug!(from = %rename.from, to = %rename.to, rule = ?rename.rule, "renamed column");
        }
        if !report.dropped.is_empty() {
            debug!(columns = ?report.dropped, "dropped non-canonical columns");
        }

        let ts_source = mapping.source_of(Column::Timestamp);
        if ts_source.is_none() {
            warn!(
                source = raw.source.as_deref().unwrap_or("<inline>"),
                "no timestamp column; synthesizing one-minute timestamps"
            );
        }

        let mut samples = Vec::with_capacity(raw.len());
        for row in 0..raw.len() {
            let mut sample = TelemetrySample::default();
            sample.timestamp = match ts_source {
                Some(col) => {
                    let cell = parse_timestamp(raw.cell(row, col).unwrap_or(""));
                    if cell.is_invalid() {
                        report.timestamp_parse_failures += 1;
                    }
                    cell.value()
                }
                None => Some(self.synthetic_timestamp(row)),
            };
            for column in Column::ALL.into_iter().skip(1) {
                let Some(col) = mapping.source_of(column) else {
                    continue;
                };
                let cell = parse_number(raw.cell(row, col).unwrap_or(""));
                if cell.is_invalid() {
                    report.value_parse_failures += 1;
                }
                sample.set_value(column, cell.value());
            }
            samples.push(sample);
        }

        if report.timestamp_parse_failures > 0 {
            warn!(
                failures = report.timestamp_parse_failures,
                "unparseable timestamps treated as missing"
            );
        }
        if report.value_parse_failures > 0 {
            warn!(
                failures = report.value_parse_failures,
                "unparseable numeric cells treated as missing"
            );
        }

        report.duplicate_timestamps_adjusted = separate_duplicates(&mut samples);
        if report.duplicate_timestamps_adjusted > 0 {
            warn!(
                rows = report.duplicate_timestamps_adjusted,
                "duplicate timestamps separated by per-row millisecond offsets"
            );
        }

        sort_by_timestamp(&mut samples);

        for column in Column::ALL {
            let missing = match column {
                Column::Timestamp => samples.iter().filter(|s| s.timestamp.is_none()).count(),
                c => samples.iter().filter(|s| s.value(c).is_none()).count(),
            };
            if missing > 0 {
                report.missing_values.insert(column, missing);
            }
        }
        if !report.missing_values.is_empty() {
            debug!(missing = ?report.missing_values, "missing values after normalization");
        }

        (samples, report)
    }

    fn synthetic_timestamp(&self, row: usize) -> DateTime<Utc> {
        let step = self.options.synthetic_step * i32::try_from(row).unwrap_or(i32::MAX);
        self.options.synthetic_start + step
    }
}

/// Shift every row that shares its timestamp with another row by
/// `row position × 1 ms`, in the order rows were read. Returns how many rows
/// belonged to a duplicate group.
fn separate_duplicates(samples: &mut [TelemetrySample]) -> usize {
    let mut counts: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for ts in samples.iter().filter_map(|s| s.timestamp) {
        *counts.entry(ts).or_default() += 1;
    }
    let mut adjusted = 0;
    for (idx, sample) in samples.iter_mut().enumerate() {
        if let Some(ts) = sample.timestamp {
            if counts.get(&ts).copied().unwrap_or(0) > 1 {
                sample.timestamp = Some(ts + Duration::milliseconds(idx as i64));
                adjusted += 1;
            }
        }
    }
    adjusted
}
