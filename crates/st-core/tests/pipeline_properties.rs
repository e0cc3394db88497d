//! Property-based tests for normalization, threshold and cycle invariants.

use proptest::prelude::*;
use st_config::{default_thresholds, ThresholdConfig};
use st_core::alarms::classify_band;
use st_core::render::{JsonRenderer, ReportRenderer, ReportView};
use st_core::{AnalysisSettings, FeatureDeriver, Normalizer, Pipeline, RawTable, ThresholdEvaluator};
use st_common::PhysicalConstants;

/// Rows of (minute offset, temperature, voltage); minute offsets repeat often.
fn rows_strategy(max_rows: usize) -> impl Strategy<Value = Vec<(u32, f64, f64)>> {
    prop::collection::vec((0u32..8, 0.0f64..60.0, 6.0f64..9.0), 0..max_rows)
}

fn raw_table(rows: &[(u32, f64, f64)]) -> RawTable {
    let headers = vec![
        "Timestamp".to_string(),
        "Temperature".to_string(),
        "Battery_Voltage".to_string(),
    ];
    let cells = rows
        .iter()
        .map(|(minute, t, v)| {
            vec![
                format!("2026-01-01 00:{minute:02}:00"),
                format!("{t}"),
                format!("{v}"),
            ]
        })
        .collect();
    RawTable::new(headers, cells).with_source("generated")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn normalized_timestamps_are_strictly_ascending(rows in rows_strategy(120)) {
        let normalized = Normalizer::default().normalize(&raw_table(&rows));
        let stamps: Vec<_> = normalized
            .table
            .samples()
            .iter()
            .filter_map(|s| s.timestamp)
            .collect();

        prop_assert_eq!(stamps.len(), rows.len());
        for pair in stamps.windows(2) {
            prop_assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn each_value_raises_at_most_one_alarm(rows in rows_strategy(60)) {
        let normalized = Normalizer::default().normalize(&raw_table(&rows));
        let table = FeatureDeriver::new(PhysicalConstants::default()).derive(&normalized.table);
        let evaluator = ThresholdEvaluator::new(&ThresholdConfig::default());
        let defaults = default_thresholds();

        let expected_temperature = rows
            .iter()
            .filter(|(_, t, _)| classify_band(*t, &defaults.temperature).is_some())
            .count();
        let expected_voltage = rows
            .iter()
            .filter(|(_, _, v)| classify_band(*v, &defaults.battery_voltage).is_some())
            .count();

        prop_assert_eq!(evaluator.check_temperature(&table).len(), expected_temperature);
        prop_assert_eq!(evaluator.check_battery_voltage(&table).len(), expected_voltage);
    }

    #[test]
    fn cycles_cover_every_row_once(rows in rows_strategy(95), cycle_size in 1usize..15) {
        let settings = AnalysisSettings { cycle_size, ..Default::default() };
        let pipeline = Pipeline::new(settings, &ThresholdConfig::default()).unwrap();
        let output = pipeline.run(&[raw_table(&rows)]);

        prop_assert_eq!(output.cycles.len(), rows.len().div_ceil(cycle_size));
        let covered: usize = output.cycles.iter().map(|c| c.record_count).sum();
        prop_assert_eq!(covered, rows.len());
        for (idx, cycle) in output.cycles.iter().enumerate() {
            prop_assert_eq!(cycle.cycle_number, idx + 1);
        }
    }

    #[test]
    fn repeated_runs_render_identically(rows in rows_strategy(40)) {
        let pipeline = Pipeline::new(AnalysisSettings::default(), &ThresholdConfig::default()).unwrap();
        let raw = [raw_table(&rows)];
        let first = JsonRenderer.render(&pipeline.run(&raw), ReportView::Summary).unwrap();
        let second = JsonRenderer.render(&pipeline.run(&raw), ReportView::Summary).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn ninety_five_rows_make_ten_cycles() {
    let rows: Vec<(u32, f64, f64)> = (0..95).map(|i| (i % 8, 25.0, 7.8)).collect();
    let pipeline = Pipeline::new(AnalysisSettings::default(), &ThresholdConfig::default()).unwrap();
    let output = pipeline.run(&[raw_table(&rows)]);
    assert_eq!(output.cycles.len(), 10);
    assert_eq!(output.cycles[9].record_count, 5);
}
