//! Error handling for the unolink crate
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for unolink operations
#[derive(Error, Debug)]
pub enum PanelError {
    /// Errors surfaced by the serial port layer
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Device handle missing, closed, or not usable at the point of use
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Session lifecycle violations (double start, stop while idle, ...)
    #[error("Session error: {0}")]
    Session(String),

    /// Summarization attempted on a store with no data rows, or no store at all
    #[error("Empty or missing session store: {0}")]
    EmptySession(String),

    /// Errors while rendering the session figure
    #[error("Figure rendering error: {0}")]
    Figure(String),

    /// Errors from the external compile/upload tool
    #[error("Flash error: {0}")]
    Flash(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PanelError>,
    },
}

impl PanelError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PanelError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for unolink operations
pub type Result<T> = std::result::Result<T, PanelError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
