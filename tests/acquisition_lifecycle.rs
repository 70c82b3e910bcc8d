//! Integration tests for the acquisition lifecycle
//!
//! These tests drive the session recorder against a scripted device and
//! verify the on-disk record store:
//! - Start/stop transitions and their protocol bytes
//! - Line classification during polling
//! - Store contents across consecutive sessions

use std::time::Duration;
use unolink::device::MockDevice;
use unolink::recorder::{RecordStore, SessionRecorder, STORE_HEADER};
use unolink::types::SessionState;

const TIMEOUT: Duration = Duration::from_millis(10);

#[test]
fn test_full_session_writes_a_well_formed_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut device = MockDevice::with_lines(["512.0", "ON", "513.5", "garbage", "511.25"]);
    let mut recorder = SessionRecorder::new();

    let info = recorder
        .start(&mut device, dir.path(), Some("lifecycle.csv"))
        .unwrap();

    for _ in 0..5 {
        recorder.poll_tick(&mut device, TIMEOUT);
    }
    let closed = recorder.stop(&mut device).unwrap();

    assert_eq!(closed.samples, 3);
    assert_eq!(closed.stats.status_lines, 1);
    assert_eq!(closed.stats.malformed_lines, 1);

    let content = std::fs::read_to_string(&info.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], STORE_HEADER);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with(",512"));
    assert!(lines[2].ends_with(",513.5"));
    assert!(lines[3].ends_with(",511.25"));

    // Sensor enable then disable, nothing else
    assert_eq!(device.written(), b"oc");
}

#[test]
fn test_consecutive_sessions_use_separate_stores() {
    let dir = tempfile::tempdir().unwrap();
    let mut device = MockDevice::with_lines(["1.0"]);
    let mut recorder = SessionRecorder::new();

    let first = recorder
        .start(&mut device, dir.path(), Some("first.csv"))
        .unwrap();
    recorder.poll_tick(&mut device, TIMEOUT);
    recorder.stop(&mut device).unwrap();

    device.push_line("2.0");
    let second = recorder
        .start(&mut device, dir.path(), Some("second.csv"))
        .unwrap();
    recorder.poll_tick(&mut device, TIMEOUT);
    recorder.stop(&mut device).unwrap();

    assert_ne!(first.path, second.path);

    let first_samples = RecordStore::read_samples(&first.path).unwrap();
    let second_samples = RecordStore::read_samples(&second.path).unwrap();
    assert_eq!(first_samples.len(), 1);
    assert_eq!(first_samples[0].value, 1.0);
    assert_eq!(second_samples.len(), 1);
    assert_eq!(second_samples[0].value, 2.0);
}

#[test]
fn test_recorder_returns_to_idle_after_each_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut device = MockDevice::new();
    let mut recorder = SessionRecorder::new();

    for _ in 0..3 {
        recorder.start(&mut device, dir.path(), None).unwrap();
        assert_eq!(recorder.state(), SessionState::Collecting);
        recorder.stop(&mut device).unwrap();
        assert_eq!(recorder.state(), SessionState::Idle);
    }
}

#[test]
fn test_read_errors_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut device = MockDevice::with_lines(["7.5"]);
    device.fail_reads("line noise");
    let mut recorder = SessionRecorder::new();

    recorder
        .start(&mut device, dir.path(), Some("noisy.csv"))
        .unwrap();
    assert!(recorder.poll_tick(&mut device, TIMEOUT).is_none());
    assert!(recorder.is_collecting());
    assert_eq!(recorder.stats().read_errors, 1);

    // The link recovers and the session carries on
    device.recover_reads();
    assert!(recorder.poll_tick(&mut device, TIMEOUT).is_some());
    let closed = recorder.stop(&mut device).unwrap();
    assert_eq!(closed.samples, 1);
}
