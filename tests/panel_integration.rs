//! Integration tests for the panel backend
//!
//! These tests run the full worker loop on its own thread against a scripted
//! device and validate the message traffic:
//! - Connection and shutdown
//! - A complete logging session with artifacts
//! - Statistics updates

use std::thread;
use std::time::{Duration, Instant};
use unolink::config::PanelConfig;
use unolink::device::MockDevice;
use unolink::panel::{PanelBackend, PanelMessage};
use unolink::types::ConnectionStatus;

/// Route worker tracing through the test harness, once per binary
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn fast_config(data_dir: &std::path::Path) -> PanelConfig {
    init_tracing();
    let mut config = PanelConfig::default();
    config.collection.data_dir = data_dir.to_path_buf();
    config.collection.poll_interval_ms = 5;
    config.serial.read_timeout_ms = 2;
    config
}

/// Drain messages until `pred` matches one or the deadline passes
fn wait_for<F>(handle: &unolink::panel::PanelHandle, mut pred: F) -> Vec<PanelMessage>
where
    F: FnMut(&PanelMessage) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        while let Some(msg) = handle.try_recv() {
            let done = pred(&msg);
            seen.push(msg);
            if done {
                return seen;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    seen
}

#[test]
fn test_backend_connects_and_shuts_down() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let (backend, handle) = PanelBackend::with_device(config, Box::new(MockDevice::new()));

    let worker = thread::spawn(move || backend.run());

    handle.connect(None);
    let messages = wait_for(&handle, |m| {
        matches!(m, PanelMessage::ConnectionStatus(ConnectionStatus::Connected))
    });
    assert!(!messages.is_empty());

    handle.shutdown();
    let messages = wait_for(&handle, |m| matches!(m, PanelMessage::Shutdown));
    assert!(messages
        .iter()
        .any(|m| matches!(m, PanelMessage::Shutdown)));
    worker.join().unwrap();
}

#[test]
fn test_logging_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let device = MockDevice::with_lines(["12.5", "ON", "13.0", "bad", "14.25"]);
    let (backend, handle) = PanelBackend::with_device(config, Box::new(device));

    let worker = thread::spawn(move || backend.run());

    handle.connect(None);
    handle.start_logging(Some("integration.csv".to_string()));

    let messages = wait_for(&handle, |m| {
        matches!(m, PanelMessage::SampleRecorded { value } if *value == 14.25)
    });
    let started = messages
        .iter()
        .find_map(|m| match m {
            PanelMessage::LoggingStarted { path } => Some(path.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(started, dir.path().join("integration.csv"));

    handle.stop_logging();
    let messages = wait_for(&handle, |m| matches!(m, PanelMessage::SessionComplete { .. }));
    let (success, artifacts) = messages
        .iter()
        .find_map(|m| match m {
            PanelMessage::SessionComplete {
                success, artifacts, ..
            } => Some((*success, artifacts.clone())),
            _ => None,
        })
        .unwrap();

    assert!(success);
    let artifacts = artifacts.unwrap();
    assert_eq!(artifacts.stats.count, 3);
    assert!(artifacts.figure_path.exists());
    assert!(artifacts.stats_path.exists());

    handle.shutdown();
    worker.join().unwrap();
}

#[test]
fn test_stats_request_is_answered() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let device = MockDevice::with_lines(["1.0", "2.0"]);
    let (backend, handle) = PanelBackend::with_device(config, Box::new(device));

    let worker = thread::spawn(move || backend.run());

    handle.connect(None);
    handle.start_logging(Some("stats.csv".to_string()));
    wait_for(&handle, |m| {
        matches!(m, PanelMessage::SampleRecorded { value } if *value == 2.0)
    });

    handle.request_stats();
    let messages = wait_for(&handle, |m| matches!(m, PanelMessage::Stats(_)));
    let stats = messages
        .iter()
        .find_map(|m| match m {
            PanelMessage::Stats(stats) => Some(stats.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(stats.samples_recorded, 2);

    handle.shutdown();
    worker.join().unwrap();
}

#[test]
fn test_shutdown_mid_session_still_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let device = MockDevice::with_lines(["5.0", "6.0"]);
    let (backend, handle) = PanelBackend::with_device(config, Box::new(device));

    let worker = thread::spawn(move || backend.run());

    handle.connect(None);
    handle.start_logging(Some("interrupted.csv".to_string()));
    wait_for(&handle, |m| {
        matches!(m, PanelMessage::SampleRecorded { value } if *value == 6.0)
    });

    // Shut down without stopping the session first
    handle.shutdown();
    worker.join().unwrap();

    let messages = handle.drain();
    let complete = messages
        .iter()
        .any(|m| matches!(m, PanelMessage::SessionComplete { success: true, .. }));
    assert!(complete);
    assert!(dir.path().join("interrupted_stats.txt").exists());
}
