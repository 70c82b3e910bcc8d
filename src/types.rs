//! Core data types for unolink
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing samples, session state, and collection
//! statistics.
//!
//! # Main Types
//!
//! - [`Sample`] - A single timestamped sensor observation
//! - [`SessionState`] - Recorder lifecycle state (idle vs collecting)
//! - [`ConnectionStatus`] - Connection state to the board
//! - [`CollectionStats`] - Per-session counters, including the
//!   malformed-line counter that makes dropped input observable
//! - [`LedColor`] - The three LEDs the board exposes
//!
//! # Timestamps
//!
//! Capture timestamps are wall-clock local time with one-second display
//! resolution, matching the record store's `YYYY-MM-DD HH:MM:SS` row format.
//! Monotonic ordering is guaranteed within a session by the single poll
//! trigger, not by the clock.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Row timestamp format used by the record store
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single sensor observation
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock capture timestamp, assigned at parse time
    pub timestamp: NaiveDateTime,
    /// Numeric reading, unit-less (device-defined scale)
    pub value: f64,
}

impl Sample {
    /// Create a sample with an explicit timestamp
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Create a sample stamped with the current local time
    pub fn now(value: f64) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            value,
        }
    }

    /// Render the capture timestamp in the record store's row format
    pub fn format_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Recorder lifecycle state
///
/// `Idle` and `Collecting` are process-wide (there is one device); a closed
/// session is represented by the recorder returning to `Idle` and handing the
/// finalized store path to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session is active
    #[default]
    Idle,
    /// A session is active and the poll trigger is armed
    Collecting,
}

impl SessionState {
    /// Check whether a session is currently active
    pub fn is_collecting(&self) -> bool {
        matches!(self, SessionState::Collecting)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Collecting => write!(f, "Collecting"),
        }
    }
}

/// Represents the connection status to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not connected to any board
    #[default]
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected and ready
    Connected,
    /// Connection error occurred
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Statistics about one acquisition session
///
/// Malformed lines are counted rather than silently discarded so the data
/// quality of a session stays observable to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of poll ticks that attempted a read
    pub ticks: u64,
    /// Number of samples appended to the record store
    pub samples_recorded: u64,
    /// Number of protocol status acknowledgements seen ("ON"/"OFF")
    pub status_lines: u64,
    /// Number of lines that were neither a status token nor a parseable number
    pub malformed_lines: u64,
    /// Number of device read failures
    pub read_errors: u64,
    /// Number of record store append failures
    pub store_errors: u64,
}

impl CollectionStats {
    /// Total lines consumed from the device, regardless of classification
    pub fn lines_seen(&self) -> u64 {
        self.samples_recorded + self.status_lines + self.malformed_lines
    }

    /// Fraction of consumed lines that were valid readings, as a percentage
    pub fn sample_rate(&self) -> f64 {
        let total = self.lines_seen();
        if total == 0 {
            100.0
        } else {
            (self.samples_recorded as f64 / total as f64) * 100.0
        }
    }
}

/// The three LEDs exposed by the panel sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedColor {
    Red,
    Yellow,
    Blue,
}

impl std::fmt::Display for LedColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedColor::Red => write!(f, "red"),
            LedColor::Yellow => write!(f, "yellow"),
            LedColor::Blue => write!(f, "blue"),
        }
    }
}
