//! Device layer: the byte-stream link to the board
//!
//! This module abstracts the serial channel behind the [`ByteStreamDevice`]
//! trait so the acquisition core can run against real hardware
//! ([`SerialDevice`]) or a scripted stand-in ([`MockDevice`]) in tests.
//!
//! # Ownership
//!
//! Exactly one component owns the device handle at a time (the panel worker);
//! everything else borrows it for the duration of a call. There is no shared
//! global handle.
//!
//! # Components
//!
//! - [`ByteStreamDevice`] - Line-oriented bidirectional channel trait
//! - [`SerialDevice`] - serialport-backed implementation, plus Uno detection
//! - [`MockDevice`] - Scripted device for tests and demos
//! - [`protocol`] - Single-byte command encoding and status tokens

pub mod mock;
pub mod protocol;
pub mod serial;

pub use mock::MockDevice;
pub use protocol::{Command, StatusToken};
pub use serial::{detect_uno, list_ports, DetectedBoard, SerialDevice};

use crate::error::Result;
use std::time::Duration;

/// An open, bidirectional, line-oriented channel to the board
///
/// Implementations must be `Send` so the handle can live on the worker
/// thread.
pub trait ByteStreamDevice: Send {
    /// Write raw bytes to the device
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush any buffered output to the device
    fn flush(&mut self) -> Result<()>;

    /// Read one newline-terminated line, waiting at most `timeout`
    ///
    /// Returns `Ok(None)` when no complete line arrived within the bound.
    /// The returned line has its terminator stripped; interior whitespace is
    /// preserved for the parser to handle.
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>>;

    /// Check whether the device can currently be read from
    fn is_readable(&self) -> bool;

    /// Check whether the device can currently be written to
    fn is_writable(&self) -> bool;

    /// Human-readable description of the device (port name, etc.)
    fn description(&self) -> String {
        "byte-stream device".to_string()
    }

    /// Encode and write a protocol command, then flush
    fn send_command(&mut self, command: &Command) -> Result<()> {
        self.write_bytes(&command.encode())?;
        self.flush()
    }
}
