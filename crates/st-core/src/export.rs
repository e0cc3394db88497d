//! CSV export of the processed (enriched) table.
//!
//! Columns are `timestamp` followed by every numeric column in
//! [`NumericColumn::ALL`] order. Timestamps are RFC 3339; missing values are
//! empty cells.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use st_common::{Error, Result};
use tracing::info;

use crate::model::{EnrichedTable, NumericColumn};

/// Header row of the processed-data export.
pub fn enriched_headers() -> Vec<&'static str> {
    std::iter::once("timestamp")
        .chain(NumericColumn::ALL.iter().map(|c| c.name()))
        .collect()
}

/// Write `table` as CSV to any writer.
pub fn write_enriched_csv<W: Write>(table: &EnrichedTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(enriched_headers()).map_err(csv_error)?;
    for row in table.rows() {
        let mut record = Vec::with_capacity(NumericColumn::ALL.len() + 1);
        record.push(
            row.sample
                .timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        );
        record.extend(
            NumericColumn::ALL
                .iter()
                .map(|c| row.value(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record).map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `table` to `path`, creating parent directories as needed.
pub fn export_enriched(table: &EnrichedTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_enriched_csv(table, BufWriter::new(file))?;
    info!(path = %path.display(), rows = table.len(), "processed data exported");
    Ok(())
}

fn csv_error(err: csv::Error) -> Error {
    Error::Io(io::Error::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrichedSample, TelemetrySample};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn table() -> EnrichedTable {
        let stamp = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        EnrichedTable::new(vec![
            EnrichedSample {
                sample: TelemetrySample {
                    timestamp: Some(stamp),
                    temperature: Some(25.5),
                    a: Some(7000.0),
                    ..Default::default()
                },
                ..Default::default()
            },
            EnrichedSample::default(),
        ])
    }

    #[test]
    fn header_lists_timestamp_then_numeric_columns() {
        let headers = enriched_headers();
        assert_eq!(headers.len(), 1 + NumericColumn::ALL.len());
        assert_eq!(headers[0], "timestamp");
        assert_eq!(headers[1], "temperature");
        assert_eq!(headers.last().copied(), Some("is_night"));
    }

    #[test]
    fn missing_values_are_empty_cells() {
        let mut buf = Vec::new();
        write_enriched_csv(&table(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026-01-01T12:00:00+00:00,25.5,,7000,"));
        let cells: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(cells.len(), 1 + NumericColumn::ALL.len());
        assert_eq!(cells[0], "");
        assert_eq!(cells[1], "");
        // Change rates default to zero rather than missing.
        assert_eq!(cells[11], "0");
    }

    #[test]
    fn export_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed").join("data.csv");
        export_enriched(&table(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 1 + NumericColumn::ALL.len());
        assert_eq!(reader.records().count(), 2);
    }
}
