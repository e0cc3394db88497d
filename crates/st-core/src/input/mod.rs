//! Raw telemetry ingestion.
//!
//! Input files are read into a [`RawTable`] of untyped text cells. Nothing is
//! interpreted here; header reconciliation and value parsing belong to
//! [`crate::normalize`].

pub mod csv;

pub use self::csv::{collect_inputs, load_inputs, read_csv, read_csv_from_reader};

/// An untyped table as read from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Where the table came from (file path), for reporting.
    pub source: Option<String>,
    pub headers: Vec<String>,
    /// Data rows. A row may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: None,
            headers,
            rows,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at (`row`, `col`), `None` when the row is too short.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}
