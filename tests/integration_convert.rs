//! Integration tests for the full conversion workflow
//!
//! These tests drive the complete pipeline on fixture files: convert a raw
//! CSV trace, validate the stored statistics and hash, extract the data
//! for ProFiDo and filter the converted trace by expression.

use std::path::PathBuf;
use tempfile::TempDir;
use traceconv::config::AppSettings;
use traceconv::convert::{ConvertOptions, convert_trace};
use traceconv::filter;
use traceconv::integrity::validator;
use traceconv::profido;
use traceconv::trace::{StatValue, TraceDocument};

fn test_settings(dir: &TempDir) -> AppSettings {
    AppSettings {
        raw_traces_dir: PathBuf::from("testdata"),
        converted_traces_dir: dir.path().join("converted"),
        profido_traces_dir: dir.path().join("profido"),
        ..Default::default()
    }
}

fn convert_fixture(stem: &str, columns: Vec<usize>) -> ConvertOptions {
    ConvertOptions {
        input: PathBuf::from("testdata/interarrival.csv"),
        columns,
        source: "testbed".to_owned(),
        description: "inter-arrival times and packet sizes".to_owned(),
        tracedata_description: vec!["seconds".to_owned(), "bytes".to_owned()],
        user: "integration".to_owned(),
        additional_information: vec!["lab run".to_owned()],
        statistics_format: "%.6f".parse().unwrap(),
        result_stem: stem.to_owned(),
        overwrite: false,
        profido_stem: None,
    }
}

#[test]
fn test_convert_validate_extract_flow() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    // Convert
    let outcome = convert_trace(&convert_fixture("flow", vec![0, 1]), &settings)
        .expect("conversion should succeed for the fixture");
    assert!(outcome.statistics_computed);

    let trace = TraceDocument::load(&outcome.trace_path).unwrap();
    assert_eq!(trace.column_count(), 2);
    assert_eq!(trace.traceheader.metainformation.name, "interarrival.csv");
    assert_eq!(
        trace.traceheader.metainformation.additional_information,
        Some(vec!["lab run".to_owned()])
    );
    assert_eq!(trace.tracebody.tracedata[0].len(), 10);
    for (_, values) in trace.traceheader.statistics.named() {
        assert_eq!(values.len(), 2, "one statistic entry per column");
    }

    // Validate statistics and hash of the freshly converted trace
    let report = validator::verify_statistics(&outcome.trace_path, 0.001).unwrap();
    assert!(report.valid, "{}", report.format_cli());

    let hash_result = validator::hash_check(&outcome.trace_path).unwrap();
    assert!(hash_result.passed, "{}", hash_result.format_cli());

    // Extract for ProFiDo
    let extract = profido::ExtractOptions {
        trace: outcome.trace_path.clone(),
        result_stem: "flow".to_owned(),
        float_format: "%e".parse().unwrap(),
        overwrite: false,
    };
    let profido_path = profido::extract_columns(&extract, &settings).unwrap();
    let content = std::fs::read_to_string(&profido_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 10, "one row per tracedata element");
    assert_eq!(lines[0], "1.000000e+00\t1.000000e+02");
    assert!(lines.iter().all(|l| l.split('\t').count() == 2));
}

#[test]
fn test_tampering_is_detected_and_restorable() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let outcome =
        convert_trace(&convert_fixture("tamper", vec![0]), &settings).unwrap();

    // Tamper with a data point
    let mut trace = TraceDocument::load(&outcome.trace_path).unwrap();
    trace.tracebody.tracedata[0][3] = 9999.0;
    trace.save(&outcome.trace_path).unwrap();

    let hash_result = validator::hash_check(&outcome.trace_path).unwrap();
    assert!(!hash_result.passed);

    let report = validator::verify_statistics(&outcome.trace_path, 0.001).unwrap();
    assert!(!report.valid);

    // Restoring the traceheader makes both checks pass again
    validator::restore_traceheader(&outcome.trace_path, &"%.6f".parse().unwrap()).unwrap();

    let report = validator::verify_statistics(&outcome.trace_path, 0.001).unwrap();
    assert!(report.valid, "{}", report.format_cli());
    let hash_result = validator::hash_check(&outcome.trace_path).unwrap();
    assert!(hash_result.passed, "{}", hash_result.format_cli());
}

#[test]
fn test_filter_over_converted_traces() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let times = convert_trace(&convert_fixture("times", vec![0]), &settings).unwrap();
    let sizes = convert_trace(&convert_fixture("sizes", vec![1]), &settings).unwrap();
    let traces = vec![times.trace_path, sizes.trace_path];

    // The size column has a mean around 118, the time column around 5.75
    let matches = filter::filter_traces("mean > 50", &traces).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].trace_name, "sizes_sf.json");
    assert_eq!(matches[0].column, 0);

    let matches = filter::filter_traces("1 < mean < 1000 and variance > 0", &traces).unwrap();
    assert_eq!(matches.len(), 2);

    let matches = filter::filter_traces("skewness > 100", &traces).unwrap();
    assert!(matches.is_empty());

    assert!(filter::filter_traces("mean >", &traces).is_err());
}

#[test]
fn test_convert_rejects_text_column() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let options = ConvertOptions {
        input: PathBuf::from("testdata/mixed.csv"),
        columns: vec![1],
        result_stem: "mixed".to_owned(),
        ..convert_fixture("mixed", vec![1])
    };
    let err = convert_trace(&options, &settings).unwrap_err();
    assert!(err.to_string().contains("name"), "error names the column: {err}");
}

#[test]
fn test_short_trace_statistics_are_rejected_by_validator() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    // keep only the numeric id column of the 5-row fixture, then shorten it
    let outcome = convert_trace(
        &ConvertOptions {
            input: PathBuf::from("testdata/mixed.csv"),
            columns: vec![0],
            result_stem: "short".to_owned(),
            ..convert_fixture("short", vec![0])
        },
        &settings,
    )
    .unwrap();

    let mut trace = TraceDocument::load(&outcome.trace_path).unwrap();
    trace.tracebody.tracedata[0].truncate(3);
    trace.traceheader.statistics.mean[0] = StatValue::Text("bogus".to_owned());
    trace.save(&outcome.trace_path).unwrap();

    assert!(validator::verify_statistics(&outcome.trace_path, 0.01).is_err());
}
