//! End-to-end runs: delimited file in, result tables and summary out

use pipeline::params::keys;
use pipeline::sink::{CLEANED_FILE, DIFFERENTIAL_FILE, RAW_FILE, SLIP_FILE, SUMMARY_FILE};
use pipeline::{CsvDirectorySink, OutputSink, Pipeline, PipelineError, PipelineParams, RawParams};
use std::fs;
use std::path::Path;
use telemetry_frame::SlipSide;

const HEADER: &str = "Time (s),Right Wheel Speed (RPM),Left Wheel Speed (RPM)";

fn write_input(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_slip_and_differential_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "session.csv",
        &[
            "0.0,500,500",
            "0.125,900,500",
            "0.25,910,505",
            // beyond the gap limit: compared for differential only
            "1.0,100,500",
        ],
    );

    let pipeline = Pipeline::new(PipelineParams::default()).unwrap();
    let output = pipeline.run_path(&input).unwrap();

    assert_eq!(output.slip.len(), 1);
    assert_eq!(output.slip[0].sample.time, 0.125);
    assert_eq!(output.slip[0].right_delta, 400.0);
    assert_eq!(output.slip[0].side, SlipSide::Right);
    assert_eq!(output.differential.len(), 3);

    let out_dir = dir.path().join("results");
    let mut sink = CsvDirectorySink::new(&out_dir, b',');
    sink.publish(&output).unwrap();
    assert_eq!(sink.written().len(), 4);

    assert_eq!(
        lines(&out_dir.join(CLEANED_FILE)),
        vec![
            HEADER.to_string(),
            "0,500,500".to_string(),
            "0.125,900,500".to_string(),
            "0.25,910,505".to_string(),
            "1,100,500".to_string(),
        ]
    );
    assert_eq!(
        lines(&out_dir.join(SLIP_FILE)),
        vec![
            format!("{HEADER},timeGap,rightDelta,leftDelta"),
            "0.125,900,500,0.125,400,0".to_string(),
        ]
    );
    let differential = lines(&out_dir.join(DIFFERENTIAL_FILE));
    assert_eq!(differential[0], format!("{HEADER},difference"));
    assert_eq!(differential[1], "0.125,900,500,400");
    assert!(!out_dir.join(RAW_FILE).exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary["events"]["slip"], 1);
    assert_eq!(summary["events"]["slip_right"], 1);
    assert_eq!(summary["rows"]["analyzed"], 4);
    assert!(summary["input"].as_str().unwrap().ends_with("session.csv"));
}

#[test]
fn test_binning_averages_and_raw_view() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "dense.csv",
        &["0.05,100,100", "0.0,200,200", "0.05,999,999", "0.2,300,300"],
    );

    let pipeline = Pipeline::new(PipelineParams::default()).unwrap();
    let output = pipeline.run_path(&input).unwrap();

    // duplicate t=0.05 keeps the first occurrence
    assert_eq!(output.raw.len(), 3);
    let times: Vec<f64> = output.raw.samples().iter().map(|s| s.time).collect();
    assert_eq!(times, vec![0.0, 0.05, 0.2]);

    let binned = output.cleaned.samples();
    assert_eq!(binned.len(), 2);
    assert_eq!(binned[0].time, 0.0);
    assert_eq!(binned[0].right_speed, 150.0);
    assert_eq!(binned[1].time, 0.125);

    let out_dir = dir.path().join("out");
    let mut sink = CsvDirectorySink::new(&out_dir, b',').with_raw(true);
    sink.publish(&output).unwrap();
    assert_eq!(lines(&out_dir.join(RAW_FILE)).len(), 4);
}

#[test]
fn test_range_gate_and_non_numeric_rows_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "noisy.csv",
        &["0.0,5,100", "0.125,abc,100", "0.25,100,4000", "0.375,100,100"],
    );

    let pipeline = Pipeline::new(PipelineParams::default()).unwrap();
    let output = pipeline.run_path(&input).unwrap();

    assert_eq!(output.cleaned.len(), 1);
    assert_eq!(output.cleaned.samples()[0].time, 0.375);
    let report = output.summary.rows.cleaning;
    assert_eq!(report.rows_in, 4);
    assert_eq!(report.dropped_non_numeric, 1);
    assert_eq!(report.dropped_out_of_range, 2);
    assert_eq!(report.rows_kept, 1);
}

#[test]
fn test_header_only_input_writes_empty_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "empty.csv", &[]);

    let output = Pipeline::new(PipelineParams::default())
        .unwrap()
        .run_path(&input)
        .unwrap();
    let out_dir = dir.path().join("out");
    CsvDirectorySink::new(&out_dir, b',').publish(&output).unwrap();

    assert_eq!(lines(&out_dir.join(CLEANED_FILE)), vec![HEADER.to_string()]);
    assert_eq!(lines(&out_dir.join(SLIP_FILE)).len(), 1);
    assert_eq!(lines(&out_dir.join(DIFFERENTIAL_FILE)).len(), 1);
}

#[test]
fn test_custom_columns_and_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.tsv");
    fs::write(&path, "t\tright\tleft\n0.0\t100\t300\n").unwrap();

    let raw = RawParams::from_pairs([
        (keys::TIME_COLUMN, "t"),
        (keys::RIGHT_SPEED_COLUMN, "right"),
        (keys::LEFT_SPEED_COLUMN, "left"),
        (keys::DELIMITER, "tab"),
    ]);
    let (params, warnings) = PipelineParams::resolve(&raw);
    assert!(warnings.is_empty());

    let output = Pipeline::new(params).unwrap().run_path(&path).unwrap();
    assert_eq!(output.differential.len(), 1);
    assert_eq!(output.differential[0].difference, 200.0);
}

#[test]
fn test_rejected_parameters_reach_summary() {
    let raw = RawParams::from_pairs([(keys::SLIP_THRESHOLD, "fast")]);
    let (params, warnings) = PipelineParams::resolve(&raw);
    assert_eq!(params.slip_threshold, 200.0);

    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "s.csv", &["0.0,100,100"]);
    let output = Pipeline::new(params)
        .unwrap()
        .with_warnings(warnings)
        .run_path(&input)
        .unwrap();
    assert_eq!(output.summary.warnings.len(), 1);
    assert_eq!(output.summary.warnings[0].name, keys::SLIP_THRESHOLD);
}

#[test]
fn test_missing_required_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    fs::write(&path, "Time (s),Right Wheel Speed (RPM)\n0.0,100\n").unwrap();

    let err = Pipeline::new(PipelineParams::default())
        .unwrap()
        .run_path(&path)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
}
