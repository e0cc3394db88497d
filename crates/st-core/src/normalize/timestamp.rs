//! Lenient timestamp and numeric cell parsing.
//!
//! Accepted timestamp forms, tried in order:
//! - RFC 3339 with offset (converted to UTC)
//! - `YYYY-MM-DD HH:MM:SS[.fff]`, with either a space or `T` separator, and an
//!   optional trailing offset
//! - `YYYY/MM/DD HH:MM:SS[.fff]`
//! - `YYYY-MM-DD HH:MM` and `YYYY/MM/DD HH:MM`
//! - bare dates (`YYYY-MM-DD`, `YYYY/MM/DD`) at midnight
//! - Unix epoch seconds (integer or fractional)
//!
//! Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Tokens read as a missing value rather than a parse failure.
const MISSING_TOKENS: &[&str] = &["", "nan", "nat", "na", "n/a", "null", "none"];

/// Outcome of parsing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<T> {
    Value(T),
    Missing,
    /// Text was present but could not be parsed.
    Invalid,
}

impl<T> Cell<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Cell::Invalid)
    }
}

fn is_missing_token(text: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| text.eq_ignore_ascii_case(t))
}

/// Parse a timestamp cell.
pub fn parse_timestamp(raw: &str) -> Cell<DateTime<Utc>> {
    let text = raw.trim();
    if is_missing_token(text) {
        return Cell::Missing;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Cell::Value(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Cell::Value(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Cell::Value(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Cell::Value(naive.and_utc());
            }
        }
    }
    if let Ok(secs) = text.parse::<f64>() {
        if secs.is_finite() {
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1e9).round() as u32;
            if let Some(dt) = DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)) {
                return Cell::Value(dt);
            }
        }
    }
    Cell::Invalid
}

/// Parse a numeric cell. Non-finite values are treated as missing.
pub fn parse_number(raw: &str) -> Cell<f64> {
    let text = raw.trim();
    if is_missing_token(text) {
        return Cell::Missing;
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Value(v),
        Ok(_) => Cell::Missing,
        Err(_) => Cell::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        let expected = utc(2026, 3, 4, 5, 6, 7);
        for text in [
            "2026-03-04 05:06:07",
            "2026-03-04T05:06:07",
            "2026-03-04T05:06:07Z",
            "2026/03/04 05:06:07",
            " 2026-03-04 05:06:07 ",
        ] {
            assert_eq!(parse_timestamp(text), Cell::Value(expected), "{text}");
        }
        assert_eq!(
            parse_timestamp("2026-03-04"),
            Cell::Value(utc(2026, 3, 4, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2026-03-04 05:06"),
            Cell::Value(utc(2026, 3, 4, 5, 6, 0))
        );
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        assert_eq!(
            parse_timestamp("2026-03-04T07:06:07+02:00"),
            Cell::Value(utc(2026, 3, 4, 5, 6, 7))
        );
        assert_eq!(
            parse_timestamp("2026-03-04 07:06:07+0200"),
            Cell::Value(utc(2026, 3, 4, 5, 6, 7))
        );
    }

    #[test]
    fn fractional_seconds_and_epoch() {
        let Cell::Value(dt) = parse_timestamp("2026-03-04 05:06:07.250") else {
            panic!("expected a timestamp");
        };
        assert_eq!(dt.timestamp_subsec_millis(), 250);
        assert_eq!(parse_timestamp("0"), Cell::Value(utc(1970, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn missing_and_invalid_are_distinguished() {
        assert_eq!(parse_timestamp(""), Cell::Missing);
        assert_eq!(parse_timestamp("NaT"), Cell::Missing);
        assert!(parse_timestamp("yesterday").is_invalid());
        assert!(parse_timestamp("2026-13-40 00:00:00").is_invalid());
    }

    #[test]
    fn numbers_are_parsed_leniently() {
        assert_eq!(parse_number(" 7.25 "), Cell::Value(7.25));
        assert_eq!(parse_number("-1e3"), Cell::Value(-1000.0));
        assert_eq!(parse_number("NaN"), Cell::Missing);
        assert_eq!(parse_number("null"), Cell::Missing);
        assert_eq!(parse_number(""), Cell::Missing);
        assert_eq!(parse_number("inf"), Cell::Missing);
        assert!(parse_number("12 V").is_invalid());
    }
}
