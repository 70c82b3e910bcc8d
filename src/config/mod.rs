//! Panel configuration
//!
//! Runtime settings for the panel, persisted as TOML in the
//! platform-appropriate data directory:
//! - **Linux**: `~/.local/share/unolink/config.toml`
//! - **macOS**: `~/Library/Application Support/unolink/config.toml`
//! - **Windows**: `%APPDATA%\unolink\config.toml`
//!
//! Every field carries a serde default, so a partial file (or none at all)
//! yields a usable configuration.

use crate::device::serial::{DEFAULT_BAUD_RATE, UNO_FQBN};
use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "unolink";

/// Configuration filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default interval between poll ticks in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default per-tick read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 50;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        PanelError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            PanelError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Top-level panel configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PanelConfig {
    /// Serial link settings
    #[serde(default)]
    pub serial: SerialConfig,

    /// Acquisition settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Sketch flashing settings
    #[serde(default)]
    pub flash: FlashConfig,
}

/// Serial link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Baud rate of the panel sketch
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-tick read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Interval between poll ticks in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Directory session record stores are created in
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Number of bins in the summary histogram
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_histogram_bins() -> usize {
    crate::summary::DEFAULT_BIN_COUNT
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            data_dir: default_data_dir(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

/// Sketch flashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Path to the `arduino-cli` binary
    #[serde(default = "default_cli_path")]
    pub cli_path: PathBuf,

    /// Fully qualified board name to flash
    #[serde(default = "default_board")]
    pub board: String,
}

fn default_cli_path() -> PathBuf {
    PathBuf::from("arduino-cli")
}

fn default_board() -> String {
    UNO_FQBN.to_string()
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            cli_path: default_cli_path(),
            board: default_board(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            PanelError::Config("Could not determine configuration path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path, defaults if it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PanelError::Config(format!("Failed to read configuration: {}", e)))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| PanelError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.validate();
        Ok(config)
    }

    /// Load configuration, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load configuration, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(CONFIG_FILE))
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PanelError::Config(format!("Failed to serialize configuration: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| PanelError::Config(format!("Failed to write configuration: {}", e)))
    }

    /// Clamp out-of-range values instead of rejecting the file
    ///
    /// The read timeout must stay below the poll interval or a silent device
    /// would stall the tick cadence.
    pub fn validate(&mut self) {
        if self.collection.poll_interval_ms == 0 {
            tracing::warn!("poll_interval_ms of 0 raised to 1");
            self.collection.poll_interval_ms = 1;
        }
        if self.serial.read_timeout_ms >= self.collection.poll_interval_ms {
            let clamped = (self.collection.poll_interval_ms / 2).max(1);
            tracing::warn!(
                "read_timeout_ms {} clamped to {} to stay below the poll interval",
                self.serial.read_timeout_ms,
                clamped
            );
            self.serial.read_timeout_ms = clamped;
        }
        if self.collection.histogram_bins == 0 {
            tracing::warn!("histogram_bins of 0 raised to 1");
            self.collection.histogram_bins = 1;
        }
    }

    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.collection.poll_interval_ms)
    }

    /// Read timeout as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.serial.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.collection.poll_interval_ms, 100);
        assert_eq!(config.serial.read_timeout_ms, 50);
        assert_eq!(config.collection.histogram_bins, 50);
        assert_eq!(config.flash.board, "arduino:avr:uno");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PanelConfig::default();
        config.collection.data_dir = PathBuf::from("/var/sensor");
        config.serial.baud_rate = 115200;
        config.save_to(&path).unwrap();

        let loaded = PanelConfig::load_from(&path).unwrap();
        assert_eq!(loaded.collection.data_dir, PathBuf::from("/var/sensor"));
        assert_eq!(loaded.serial.baud_rate, 115200);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = PanelConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[collection]\npoll_interval_ms = 250\n").unwrap();

        let config = PanelConfig::load_from(&path).unwrap();
        assert_eq!(config.collection.poll_interval_ms, 250);
        assert_eq!(config.serial.baud_rate, 9600);
    }

    #[test]
    fn test_validate_clamps_read_timeout_below_poll_interval() {
        let mut config = PanelConfig::default();
        config.serial.read_timeout_ms = 500;
        config.validate();
        assert!(config.serial.read_timeout_ms < config.collection.poll_interval_ms);
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let mut config = PanelConfig::default();
        config.collection.poll_interval_ms = 0;
        config.collection.histogram_bins = 0;
        config.validate();
        assert_eq!(config.collection.poll_interval_ms, 1);
        assert_eq!(config.collection.histogram_bins, 1);
    }
}
