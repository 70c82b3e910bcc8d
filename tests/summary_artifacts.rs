//! Integration tests for session summarization
//!
//! These tests verify the artifacts derived from a finalized record store:
//! - The statistics text file, line for line
//! - The two-view PNG figure
//! - Error behavior for missing and empty stores

use std::path::{Path, PathBuf};
use unolink::error::PanelError;
use unolink::recorder::RecordStore;
use unolink::summary::{summarize, DEFAULT_BIN_COUNT};
use unolink::types::Sample;

fn write_store(dir: &Path, name: &str, values: &[f64]) -> PathBuf {
    let path = dir.join(name);
    let mut store = RecordStore::create(&path).unwrap();
    for &v in values {
        store.append(&Sample::now(v)).unwrap();
    }
    store.finalize().unwrap()
}

#[test]
fn test_statistics_file_matches_the_expected_report() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), "session.csv", &[100.0, 200.0, 300.0, 400.0]);

    let artifacts = summarize(&store, DEFAULT_BIN_COUNT).unwrap();

    let report = std::fs::read_to_string(&artifacts.stats_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "Light Sensor Data Statistics");
    assert_eq!(lines[1], "==========================");
    assert_eq!(lines[2], "Total Readings: 4");
    assert_eq!(lines[3], "Average Value: 250.00");
    assert_eq!(lines[4], "Maximum Value: 400.00");
    assert_eq!(lines[5], "Minimum Value: 100.00");
    // Sample standard deviation of 100..400 step 100
    assert_eq!(lines[6], "Standard Deviation: 129.10");
}

#[test]
fn test_figure_lands_next_to_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let values: Vec<f64> = (0..60).map(|i| 500.0 + (i as f64 * 0.7).sin() * 50.0).collect();
    let store = write_store(dir.path(), "sensor_data_20260824_101500.csv", &values);

    let artifacts = summarize(&store, DEFAULT_BIN_COUNT).unwrap();

    assert_eq!(
        artifacts.figure_path,
        dir.path().join("sensor_data_20260824_101500.png")
    );
    assert_eq!(
        artifacts.stats_path,
        dir.path().join("sensor_data_20260824_101500_stats.txt")
    );

    // PNG magic bytes
    let bytes = std::fs::read(&artifacts.figure_path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_single_sample_session_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), "single.csv", &[777.0]);

    let artifacts = summarize(&store, DEFAULT_BIN_COUNT).unwrap();
    assert_eq!(artifacts.stats.count, 1);
    assert_eq!(artifacts.stats.std_dev, 0.0);
    assert!(artifacts.figure_path.exists());
}

#[test]
fn test_empty_and_missing_stores_are_empty_session_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = summarize(&dir.path().join("missing.csv"), 50).unwrap_err();
    assert!(matches!(missing, PanelError::EmptySession(_)));

    let store = write_store(dir.path(), "empty.csv", &[]);
    let empty = summarize(&store, 50).unwrap_err();
    assert!(matches!(empty, PanelError::EmptySession(_)));
}

#[test]
fn test_resummarizing_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), "again.csv", &[1.0, 2.0, 3.0]);

    let first = summarize(&store, DEFAULT_BIN_COUNT).unwrap();
    let second = summarize(&store, DEFAULT_BIN_COUNT).unwrap();

    assert_eq!(first.stats, second.stats);
    let a = std::fs::read_to_string(&first.stats_path).unwrap();
    let b = std::fs::read_to_string(&second.stats_path).unwrap();
    assert_eq!(a, b);
}
