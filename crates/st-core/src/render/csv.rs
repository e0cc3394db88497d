use serde_json::Value;
use st_common::{Error, Result};

use crate::pipeline::PipelineOutput;

use super::json::Envelope;
use super::{ReportRenderer, ReportView};

/// Flattened `key,value` rows of the JSON envelope.
///
/// Nested keys are joined with `.`; array items use their index, so the
/// first alarm's severity is `alarms.0.severity`. Nulls become empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn render(&self, output: &PipelineOutput, view: ReportView) -> Result<String> {
        let value = serde_json::to_value(Envelope::new(output, view))
            .map_err(|e| Error::Render(format!("{view:?} view: {e}")))?;
        key_value_csv(&value)
    }
}

/// Leaf values of `value` as `(dotted.key, text)` pairs, in key order.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into(value, String::new(), &mut rows);
    rows
}

fn flatten_into(value: &Value, key: String, rows: &mut Vec<(String, String)>) {
    let child = |name: &str| {
        if key.is_empty() {
            name.to_string()
        } else {
            format!("{key}.{name}")
        }
    };
    match value {
        Value::Object(map) => {
            for (name, v) in map {
                flatten_into(v, child(name), rows);
            }
        }
        Value::Array(items) => {
            for (idx, v) in items.iter().enumerate() {
                flatten_into(v, child(&idx.to_string()), rows);
            }
        }
        Value::Null => rows.push((key, String::new())),
        Value::String(s) => rows.push((key, s.clone())),
        other => rows.push((key, other.to_string())),
    }
}

/// `value` flattened into a two-column CSV document with a header row.
pub fn key_value_csv(value: &Value) -> Result<String> {
    let render_err = |e: &dyn std::fmt::Display| Error::Render(format!("csv: {e}"));
    let mut out = ::csv::Writer::from_writer(Vec::new());
    out.write_record(["key", "value"]).map_err(|e| render_err(&e))?;
    for (key, text) in flatten(value) {
        out.write_record([key, text]).map_err(|e| render_err(&e))?;
    }
    let bytes = out.into_inner().map_err(|e| render_err(&e))?;
    String::from_utf8(bytes).map_err(|e| render_err(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::read_csv_from_reader;
    use crate::pipeline::Pipeline;
    use crate::settings::AnalysisSettings;
    use serde_json::json;
    use st_config::ThresholdConfig;

    #[test]
    fn nested_keys_are_dotted_and_arrays_indexed() {
        let rows = flatten(&json!({
            "a": {"b": 1, "c": null},
            "list": ["x", {"y": true}],
        }));
        assert_eq!(
            rows,
            vec![
                ("a.b".to_string(), "1".to_string()),
                ("a.c".to_string(), String::new()),
                ("list.0".to_string(), "x".to_string()),
                ("list.1.y".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn values_with_commas_are_quoted() {
        let text = key_value_csv(&json!({"message": "high: 45, limit 40"})).unwrap();
        assert_eq!(text, "key,value\nmessage,\"high: 45, limit 40\"\n");
    }

    #[test]
    fn alarms_view_flattens_each_alarm() {
        let csv = "timestamp,temperature,battery_voltage\n\
                   2026-01-01 00:00:00,45.0,7.8\n";
        let raw = read_csv_from_reader(csv.as_bytes(), "inline").unwrap();
        let output = Pipeline::new(AnalysisSettings::default(), &ThresholdConfig::default())
            .unwrap()
            .run(&[raw]);
        let text = CsvRenderer.render(&output, ReportView::Alarms).unwrap();
        assert!(text.starts_with("key,value\n"));
        assert!(text.contains("alarms.0.parameter,temperature\n"));
        assert!(text.contains("alarms.0.severity,alarm\n"));
        assert!(text.contains("view,alarms\n"));
    }
}
