//! Session recorder: the acquisition state machine
//!
//! Owns the session lifecycle: `start` opens the record store and enables the
//! sensor, each `poll_tick` consumes at most one line from the device, and
//! `stop` disables the sensor and finalizes the store. The recorder holds no
//! device handle of its own; the caller passes a borrowed device into every
//! operation, keeping a single owner for the handle.
//!
//! # Policies
//!
//! - Starting while a session is collecting is rejected, never superseded.
//! - A failed enable/disable command write is logged and does not abort the
//!   state transition; state consistency wins over delivery confirmation.
//! - Malformed lines are dropped but counted in [`CollectionStats`], so the
//!   policy is observable rather than implicit.

use crate::device::{ByteStreamDevice, Command};
use crate::error::{PanelError, Result, ResultExt};
use crate::parse::{parse_line, ParsedLine};
use crate::types::{CollectionStats, Sample, SessionState};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::store::RecordStore;

/// Filename stamp format for sessions started without a hint
const SESSION_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Identity of one acquisition session
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session identifier (the store's file stem)
    pub id: String,
    /// Record store location
    pub path: PathBuf,
    /// Wall-clock start time
    pub started_at: NaiveDateTime,
}

/// A finished session, eligible for summarization
#[derive(Debug, Clone)]
pub struct ClosedSession {
    /// The session's identity
    pub info: SessionInfo,
    /// Number of data rows in the finalized store
    pub samples: u64,
    /// Final counters for the session
    pub stats: CollectionStats,
}

/// The acquisition state machine
#[derive(Default)]
pub struct SessionRecorder {
    state: SessionState,
    store: Option<RecordStore>,
    current: Option<SessionInfo>,
    stats: CollectionStats,
}

impl SessionRecorder {
    /// Create a recorder in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check whether a session is collecting
    pub fn is_collecting(&self) -> bool {
        self.state.is_collecting()
    }

    /// Counters for the session in progress (or the last one started)
    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    /// Identity of the active session, if any
    pub fn current_session(&self) -> Option<&SessionInfo> {
        self.current.as_ref()
    }

    /// Start a new session
    ///
    /// Fails with [`PanelError::Session`] if a session is already collecting
    /// and with [`PanelError::DeviceUnavailable`] if the device cannot be
    /// written to. The store filename is derived from the start timestamp
    /// unless `filename_hint` is given.
    pub fn start(
        &mut self,
        device: &mut dyn ByteStreamDevice,
        data_dir: &Path,
        filename_hint: Option<&str>,
    ) -> Result<SessionInfo> {
        if self.state.is_collecting() {
            return Err(PanelError::Session(
                "a session is already collecting; stop it first".to_string(),
            ));
        }
        if !device.is_writable() {
            return Err(PanelError::DeviceUnavailable(format!(
                "{} is not writable",
                device.description()
            )));
        }

        let started_at = Local::now().naive_local();
        let filename = match filename_hint {
            Some(hint) => hint.to_string(),
            None => format!(
                "sensor_data_{}.csv",
                started_at.format(SESSION_STAMP_FORMAT)
            ),
        };
        let path = data_dir.join(&filename);
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());

        let store = RecordStore::create(&path)
            .with_context(|| format!("Failed to open record store {}", path.display()))?;

        // Enable the sensor. A failed write is reported but does not abort
        // the transition; the session still opens with whatever data arrives.
        if let Err(e) = device.send_command(&Command::SensorOn) {
            tracing::warn!("Failed to send sensor-on command: {}", e);
        }

        let info = SessionInfo {
            id,
            path,
            started_at,
        };

        self.store = Some(store);
        self.current = Some(info.clone());
        self.stats = CollectionStats::default();
        self.state = SessionState::Collecting;

        tracing::info!("Session {} started, logging to {}", info.id, info.path.display());
        Ok(info)
    }

    /// One poll tick: read at most one line and record it if it is a sample
    ///
    /// Returns the recorded sample so the caller can emit its new-sample
    /// notification. The state guard makes a late tick after `stop` a no-op;
    /// a closed store can never be appended to.
    pub fn poll_tick(
        &mut self,
        device: &mut dyn ByteStreamDevice,
        read_timeout: Duration,
    ) -> Option<Sample> {
        if !self.state.is_collecting() {
            return None;
        }
        if !device.is_readable() {
            return None;
        }

        self.stats.ticks += 1;

        let line = match device.read_line(read_timeout) {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(e) => {
                self.stats.read_errors += 1;
                tracing::warn!("Device read failed: {}", e);
                return None;
            }
        };

        match parse_line(&line) {
            ParsedLine::Reading(sample) => {
                let store = self.store.as_mut()?;
                match store.append(&sample) {
                    Ok(()) => {
                        self.stats.samples_recorded += 1;
                        Some(sample)
                    }
                    Err(e) => {
                        self.stats.store_errors += 1;
                        tracing::warn!("Record store append failed: {}", e);
                        None
                    }
                }
            }
            ParsedLine::Status(token) => {
                self.stats.status_lines += 1;
                tracing::debug!("Device acknowledgement: {:?}", token);
                None
            }
            ParsedLine::Malformed => {
                self.stats.malformed_lines += 1;
                tracing::debug!("Dropping malformed line: {:?}", line);
                None
            }
        }
    }

    /// Stop the active session
    ///
    /// Disables the sensor, finalizes the store, and returns the closed
    /// session. Fails with [`PanelError::Session`] when no session is
    /// collecting; the recorder state is untouched in that case.
    pub fn stop(&mut self, device: &mut dyn ByteStreamDevice) -> Result<ClosedSession> {
        if !self.state.is_collecting() {
            return Err(PanelError::Session(
                "no session is collecting".to_string(),
            ));
        }

        if let Err(e) = device.send_command(&Command::SensorOff) {
            tracing::warn!("Failed to send sensor-off command: {}", e);
        }

        // State flips before the store is consumed so a late poll tick
        // cannot race the finalization.
        self.state = SessionState::Idle;

        let store = self.store.take().ok_or_else(|| {
            PanelError::Session("collecting session has no open store".to_string())
        })?;
        let info = self.current.take().ok_or_else(|| {
            PanelError::Session("collecting session has no identity".to_string())
        })?;

        let samples = store.rows();
        store.finalize()?;

        tracing::info!(
            "Session {} stopped: {} samples, {} malformed lines",
            info.id,
            samples,
            self.stats.malformed_lines
        );

        Ok(ClosedSession {
            info,
            samples,
            stats: self.stats.clone(),
        })
    }
}
