//! Mock device for testing without real hardware
//!
//! Plays back a script of response lines, one per `read_line` call, and
//! records every byte the host writes. Readability and writability can be
//! toggled to exercise the recorder's unavailable-device paths.
//!
//! # Example
//!
//! ```
//! use unolink::device::{ByteStreamDevice, MockDevice};
//! use std::time::Duration;
//!
//! let mut device = MockDevice::with_lines(["12.5", "ON", "13.0"]);
//! let line = device.read_line(Duration::from_millis(10)).unwrap();
//! assert_eq!(line.as_deref(), Some("12.5"));
//! ```

use crate::error::{PanelError, Result};
use std::collections::VecDeque;
use std::time::Duration;

use super::ByteStreamDevice;

/// A scripted byte-stream device
#[derive(Debug, Default)]
pub struct MockDevice {
    /// Lines returned by successive `read_line` calls, oldest first
    script: VecDeque<String>,
    /// Every byte written by the host, in order
    written: Vec<u8>,
    readable: bool,
    writable: bool,
    /// When set, writes fail with this message
    write_failure: Option<String>,
    /// When set, reads fail with this message
    read_failure: Option<String>,
}

impl MockDevice {
    /// Create an empty mock device that is readable and writable
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            written: Vec::new(),
            readable: true,
            writable: true,
            write_failure: None,
            read_failure: None,
        }
    }

    /// Create a mock device preloaded with response lines
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut device = Self::new();
        device.script = lines.into_iter().map(Into::into).collect();
        device
    }

    /// Queue one more response line
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.script.push_back(line.into());
    }

    /// Toggle readability
    pub fn set_readable(&mut self, readable: bool) {
        self.readable = readable;
    }

    /// Toggle writability
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// Make every subsequent write fail with the given message
    pub fn fail_writes(&mut self, message: impl Into<String>) {
        self.write_failure = Some(message.into());
    }

    /// Make every subsequent read fail with the given message
    pub fn fail_reads(&mut self, message: impl Into<String>) {
        self.read_failure = Some(message.into());
    }

    /// Clear a read failure, resuming the script
    pub fn recover_reads(&mut self) {
        self.read_failure = None;
    }

    /// All bytes written by the host so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of scripted lines not yet consumed
    pub fn remaining_lines(&self) -> usize {
        self.script.len()
    }
}

impl ByteStreamDevice for MockDevice {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(message) = &self.write_failure {
            return Err(PanelError::DeviceUnavailable(message.clone()));
        }
        if !self.writable {
            return Err(PanelError::DeviceUnavailable(
                "mock device is not writable".to_string(),
            ));
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<Option<String>> {
        if let Some(message) = &self.read_failure {
            return Err(PanelError::DeviceUnavailable(message.clone()));
        }
        if !self.readable {
            return Ok(None);
        }
        Ok(self.script.pop_front())
    }

    fn is_readable(&self) -> bool {
        self.readable
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn description(&self) -> String {
        "mock device".to_string()
    }
}
