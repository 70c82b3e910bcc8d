//! # unolink: Arduino Uno control panel backend
//!
//! Talks to an Arduino Uno panel sketch over its USB serial link: records
//! light-sensor readings into per-session CSV stores, summarizes finished
//! sessions into statistics and a figure, drives the board's LEDs and servo,
//! and flashes sketches through `arduino-cli`.
//!
//! ## Architecture
//!
//! - **Device**: [`device::ByteStreamDevice`] abstracts the serial link, with
//!   a real [`device::SerialDevice`] and a scripted [`device::MockDevice`]
//! - **Recorder**: [`recorder::SessionRecorder`] drives the idle/collecting
//!   state machine and the append-only record store
//! - **Summary**: [`summary::summarize`] turns a finalized store into a
//!   statistics file and a two-view PNG figure
//! - **Panel**: [`panel::PanelBackend`] runs everything on a worker thread,
//!   talking to the caller over crossbeam channels
//!
//! ## Configuration
//!
//! Settings are stored as TOML in the platform-appropriate data directory
//! under `unolink`:
//!
//! - **Linux**: `~/.local/share/unolink/`
//! - **macOS**: `~/Library/Application Support/unolink/`
//! - **Windows**: `%APPDATA%\unolink\`
//!
//! ## Example
//!
//! ```ignore
//! use unolink::config::PanelConfig;
//! use unolink::panel::{PanelBackend, PanelMessage};
//!
//! let config = PanelConfig::load_or_default();
//! let (backend, handle) = PanelBackend::new(config);
//!
//! std::thread::spawn(move || backend.run());
//!
//! handle.connect(None); // auto-detect the Uno
//! handle.start_logging(None);
//!
//! loop {
//!     for msg in handle.drain() {
//!         match msg {
//!             PanelMessage::SampleRecorded { value } => println!("{}", value),
//!             PanelMessage::SessionComplete { message, .. } => {
//!                 println!("{}", message);
//!                 return;
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod flash;
pub mod panel;
pub mod parse;
pub mod recorder;
pub mod sched;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use config::PanelConfig;
pub use device::{ByteStreamDevice, MockDevice, SerialDevice};
pub use error::{PanelError, Result};
pub use panel::{PanelBackend, PanelCommand, PanelHandle, PanelMessage};
pub use recorder::SessionRecorder;
pub use summary::{SessionArtifacts, SummaryStats};
pub use types::{CollectionStats, LedColor, Sample, SessionState};
