//! CLI end-to-end tests for the analysis and config commands.
//!
//! Validates:
//! - exit code 0 for nominal telemetry, 1 when alarms are raised
//! - JSON envelopes for the report, cycles and alarms views
//! - text and flattened CSV output
//! - processed-data export
//! - threshold files from the command line and the environment
//! - error exit codes and the JSON error body on stderr

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// ============================================================================
// Helpers
// ============================================================================

fn st_core() -> Command {
    let mut cmd = cargo_bin_cmd!("st-core");
    cmd.timeout(Duration::from_secs(60));
    cmd.env_remove("ST_THRESHOLDS");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// `rows` one-minute samples; `hot_row` (if any) gets a 45 °C reading.
fn telemetry_csv(rows: usize, hot_row: Option<usize>) -> String {
    let mut out = String::from("timestamp,temperature,battery_voltage,a,e,i,raan,argp,mean_anomaly\n");
    for r in 0..rows {
        let temperature = if Some(r) == hot_row { 45.0 } else { 25.0 + (r % 3) as f64 * 0.1 };
        out.push_str(&format!(
            "2026-01-01 {:02}:{:02}:00,{temperature:.1},7.8,7000.0,0.001,97.5,10.0,90.0,{}\n",
            r / 60,
            r % 60,
            r as f64 * 3.6
        ));
    }
    out
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

fn fixture(rows: usize, hot_row: Option<usize>) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let path = write_file(dir.path(), "telemetry.csv", &telemetry_csv(rows, hot_row));
    (dir, path)
}

fn stdout_json(cmd: &mut Command, code: i32) -> Value {
    let output = cmd.assert().code(code).get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

// ============================================================================
// Analysis commands
// ============================================================================

#[test]
fn test_report_nominal_exits_clean() {
    let (_dir, csv) = fixture(12, None);
    let json = stdout_json(st_core().arg("report").arg(&csv), 0);

    assert_eq!(json["view"], "summary");
    assert_eq!(json["records"], 12);
    assert_eq!(json["summary"]["alarm_summary"]["total_alarms"], 0);
    assert_eq!(json["summary"]["cycle_summary"]["total_cycles"], 2);
    assert!(json.get("schema_version").is_some());
}

#[test]
fn test_report_with_alarm_exits_one() {
    let (_dir, csv) = fixture(12, Some(4));
    let json = stdout_json(st_core().arg("report").arg(&csv), 1);
    assert_eq!(json["summary"]["alarm_summary"]["total_alarms"], 1);
}

#[test]
fn test_alarms_view_lists_alarm() {
    let (_dir, csv) = fixture(12, Some(4));
    let json = stdout_json(st_core().arg("alarms").arg(&csv), 1);

    let alarms = json["alarms"].as_array().expect("alarms array");
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0]["parameter"], "temperature");
    assert_eq!(alarms[0]["severity"], "alarm");
    assert_eq!(alarms[0]["value"], 45.0);
    assert!(json.get("summary").is_none());
}

#[test]
fn test_cycles_view_respects_cycle_size() {
    let (_dir, csv) = fixture(25, None);
    let json = stdout_json(
        st_core().arg("cycles").arg(&csv).args(["--cycle-size", "10"]),
        0,
    );

    let cycles = json["cycles"].as_array().expect("cycles array");
    assert_eq!(cycles.len(), 3);
    assert_eq!(cycles[0]["cycle_number"], 1);
    assert_eq!(cycles[2]["record_count"], 5);
}

#[test]
fn test_text_format_report() {
    let (_dir, csv) = fixture(12, Some(0));
    st_core()
        .args(["--format", "text", "report"])
        .arg(&csv)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("=== Telemetry summary ==="))
        .stdout(predicate::str::contains("Alarms: 1"))
        .stdout(predicate::str::contains("Recommendations:"));
}

#[test]
fn test_directory_input_concatenates_files() {
    let dir = tempdir().expect("tempdir");
    write_file(dir.path(), "b.csv", &telemetry_csv(5, None));
    write_file(dir.path(), "a.csv", &telemetry_csv(5, None));
    write_file(dir.path(), "notes.txt", "not telemetry");

    let json = stdout_json(st_core().arg("report").arg(dir.path()), 0);
    assert_eq!(json["records"], 10);
    assert_eq!(json["normalization"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_output_flag_writes_file() {
    let (dir, csv) = fixture(5, None);
    let out = dir.path().join("report.json");
    st_core()
        .arg("report")
        .arg(&csv)
        .arg("--output")
        .arg(&out)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    let json: Value = serde_json::from_str(&fs::read_to_string(&out).expect("read report"))
        .expect("parse JSON");
    assert_eq!(json["records"], 5);
}

#[test]
fn test_csv_format_flattens_summary() {
    let (_dir, csv) = fixture(12, Some(4));
    let output = st_core()
        .args(["--format", "csv", "report"])
        .arg(&csv)
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf-8 output");
    assert!(text.starts_with("key,value\n"));
    assert!(text.contains("summary.alarm_summary.total_alarms,1\n"));
    assert!(text.contains("summary.alarm_summary.first_alarms.0.parameter,temperature\n"));
}

#[test]
fn test_export_writes_processed_table() {
    let (dir, csv) = fixture(12, None);
    let out = dir.path().join("processed").join("telemetry.csv");
    let json = stdout_json(st_core().arg("export").arg(&csv).arg("--out").arg(&out), 0);
    assert_eq!(json["rows"], 12);

    let mut reader = csv::Reader::from_path(&out).expect("open export");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.get(0), Some("timestamp"));
    assert!(headers.iter().any(|h| h == "altitude"));
    assert!(headers.iter().any(|h| h == "is_night"));
    assert_eq!(reader.records().count(), 12);
}

#[test]
fn test_export_reports_alarms_in_exit_code() {
    let (dir, csv) = fixture(12, Some(4));
    let out = dir.path().join("processed.csv");
    st_core()
        .arg("export")
        .arg(&csv)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1);
    assert!(out.exists());
}

// ============================================================================
// Threshold configuration
// ============================================================================

#[test]
fn test_cli_thresholds_override_defaults() {
    let (dir, csv) = fixture(12, Some(4));
    let thresholds = write_file(dir.path(), "limits.yaml", "temperature:\n  alarm_max: 50.0\n  warning_max: 48.0\n");

    let json = stdout_json(
        st_core().arg("alarms").arg(&csv).arg("--thresholds").arg(&thresholds),
        0,
    );
    assert!(json["alarms"].as_array().expect("alarms array").is_empty());
}

#[test]
fn test_env_thresholds_are_used() {
    let (dir, csv) = fixture(12, Some(4));
    let thresholds = write_file(
        dir.path(),
        "limits.json",
        r#"{"temperature": {"alarm_max": 50.0, "warning_max": 48.0}}"#,
    );

    st_core()
        .env("ST_THRESHOLDS", &thresholds)
        .arg("alarms")
        .arg(&csv)
        .assert()
        .code(0);
}

#[test]
fn test_missing_threshold_file_is_config_error() {
    let (dir, csv) = fixture(5, None);
    let missing = dir.path().join("nope.yaml");

    st_core()
        .arg("report")
        .arg(&csv)
        .arg("--thresholds")
        .arg(&missing)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("\"code\":10"));
}

#[test]
fn test_config_validate_rejects_inverted_bands() {
    let dir = tempdir().expect("tempdir");
    let bad = write_file(
        dir.path(),
        "bad.yaml",
        "battery_voltage:\n  alarm_min: 9.0\n  alarm_max: 8.0\n",
    );
    st_core()
        .args(["config", "validate"])
        .arg(&bad)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("battery_voltage"));
}

#[test]
fn test_config_validate_accepts_good_file() {
    let dir = tempdir().expect("tempdir");
    let good = write_file(dir.path(), "good.toml", "[temperature]\nalarm_max = 45.0\n");
    let json = stdout_json(st_core().args(["config", "validate"]).arg(&good), 0);
    assert_eq!(json["valid"], true);
}

#[test]
fn test_config_show_reports_builtin_source() {
    let json = stdout_json(st_core().args(["config", "show"]), 0);
    assert_eq!(json["source"]["kind"], "built_in");
    assert_eq!(json["thresholds"]["temperature"]["alarm_max"], 40.0);
}

#[test]
fn test_config_schema_is_json_schema() {
    let json = stdout_json(st_core().args(["config", "schema"]), 0);
    assert!(json["properties"].get("temperature").is_some());
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_missing_input_is_input_error() {
    let dir = tempdir().expect("tempdir");
    st_core()
        .arg("report")
        .arg(dir.path().join("absent.csv"))
        .assert()
        .code(11)
        .stderr(predicate::str::contains("\"error\""));
}

#[test]
fn test_empty_directory_is_input_error_in_text() {
    let dir = tempdir().expect("tempdir");
    st_core()
        .args(["--format", "text", "report"])
        .arg(dir.path())
        .assert()
        .code(11)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_malformed_record_mid_file_is_input_error() {
    let dir = tempdir().expect("tempdir");
    let mut bytes = telemetry_csv(5, None).into_bytes();
    bytes.extend_from_slice(b"2026-01-01 00:05:00,\xff\xfe,7.8,7000.0,0.001,97.5,10.0,90.0,18.0\n");
    bytes.extend_from_slice(telemetry_csv(3, None).lines().nth(1).expect("row").as_bytes());
    let path = dir.path().join("broken.csv");
    fs::write(&path, bytes).expect("write fixture");

    st_core()
        .arg("report")
        .arg(&path)
        .assert()
        .code(11)
        .stderr(predicate::str::contains("\"code\":20"))
        .stderr(predicate::str::contains("broken.csv"));
}

#[test]
fn test_zero_cycle_size_is_config_error() {
    let (_dir, csv) = fixture(5, None);
    st_core()
        .arg("cycles")
        .arg(&csv)
        .args(["--cycle-size", "0"])
        .assert()
        .code(10);
}

#[test]
fn test_no_subcommand_fails() {
    st_core().assert().failure();
}
