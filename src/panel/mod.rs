//! Panel backend: the worker thread behind the control panel
//!
//! All device I/O runs on a dedicated worker thread so a caller (a UI, a
//! CLI, a test) stays responsive. Communication goes through crossbeam
//! channels:
//!
//! - [`PanelCommand`] - Messages sent to the worker (connect, start, LED, etc.)
//! - [`PanelMessage`] - Messages sent back (samples, status, artifacts)
//! - [`PanelHandle`] - Caller-side handle for sending commands and receiving messages
//! - [`PanelBackend`] - Entry point that owns the worker loop
//!
//! # Example
//!
//! ```ignore
//! use unolink::config::PanelConfig;
//! use unolink::panel::{PanelBackend, PanelMessage};
//!
//! let (backend, handle) = PanelBackend::new(PanelConfig::load_or_default());
//! std::thread::spawn(move || backend.run());
//!
//! handle.connect(None);
//! handle.start_logging(None);
//!
//! for msg in handle.drain() {
//!     if let PanelMessage::SampleRecorded { value } = msg {
//!         println!("reading: {}", value);
//!     }
//! }
//! ```

pub mod worker;

pub use worker::PanelWorker;

use crate::config::PanelConfig;
use crate::device::ByteStreamDevice;
use crate::summary::SessionArtifacts;
use crate::types::{CollectionStats, ConnectionStatus, LedColor};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Message sent from the caller to the worker
#[derive(Debug, Clone)]
pub enum PanelCommand {
    /// Open the serial link; `None` auto-detects the Uno
    Connect {
        /// OS port name, or `None` to detect by USB identifiers
        port: Option<String>,
    },
    /// Close the serial link, stopping any active session first
    Disconnect,
    /// Switch one LED on or off
    SetLed { color: LedColor, on: bool },
    /// Move the servo to an angle in degrees
    SetServo { angle: u8 },
    /// Switch the sensor stream on or off without a recording session
    SensorPower { on: bool },
    /// Start a recording session
    StartLogging {
        /// Store filename override; `None` derives one from the start time
        filename_hint: Option<String>,
    },
    /// Stop the session and summarize it
    StopLogging,
    /// Compile and upload a sketch to the connected board
    FlashSketch { sketch_dir: PathBuf },
    /// Request a fresh port list
    RefreshPorts,
    /// Request current session statistics
    RequestStats,
    /// Shut the worker down
    Shutdown,
}

/// Message sent from the worker to the caller
#[derive(Debug, Clone)]
pub enum PanelMessage {
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// Connection attempt failed
    ConnectionError(String),
    /// Port list update (response to RefreshPorts)
    PortList(Vec<(String, String)>),
    /// A session is collecting into the given store
    LoggingStarted { path: PathBuf },
    /// One sample was appended to the active session's store
    SampleRecorded { value: f64 },
    /// A session closed; artifacts are present when summarization succeeded
    SessionComplete {
        success: bool,
        message: String,
        artifacts: Option<SessionArtifacts>,
    },
    /// One line of flashing progress
    FlashProgress(String),
    /// Terminal result of a flash attempt
    FlashComplete { success: bool, message: String },
    /// Statistics update
    Stats(CollectionStats),
    /// General status line for display
    Status(String),
    /// Worker is shutting down
    Shutdown,
}

/// Caller-side handle to the panel worker
pub struct PanelHandle {
    /// Receiver for worker messages
    pub receiver: Receiver<PanelMessage>,
    /// Sender for commands to the worker
    pub command_sender: Sender<PanelCommand>,
}

impl PanelHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<PanelMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<PanelMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the worker
    pub fn send_command(&self, cmd: PanelCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request a connection; `None` auto-detects the Uno
    pub fn connect(&self, port: Option<String>) {
        let _ = self.command_sender.send(PanelCommand::Connect { port });
    }

    /// Request disconnection
    pub fn disconnect(&self) {
        let _ = self.command_sender.send(PanelCommand::Disconnect);
    }

    /// Switch one LED on or off
    pub fn set_led(&self, color: LedColor, on: bool) {
        let _ = self.command_sender.send(PanelCommand::SetLed { color, on });
    }

    /// Move the servo to an angle in degrees
    pub fn set_servo(&self, angle: u8) {
        let _ = self.command_sender.send(PanelCommand::SetServo { angle });
    }

    /// Switch the sensor stream on or off outside a session
    pub fn sensor_power(&self, on: bool) {
        let _ = self.command_sender.send(PanelCommand::SensorPower { on });
    }

    /// Start a recording session
    pub fn start_logging(&self, filename_hint: Option<String>) {
        let _ = self
            .command_sender
            .send(PanelCommand::StartLogging { filename_hint });
    }

    /// Stop the session and summarize it
    pub fn stop_logging(&self) {
        let _ = self.command_sender.send(PanelCommand::StopLogging);
    }

    /// Compile and upload a sketch
    pub fn flash_sketch(&self, sketch_dir: impl Into<PathBuf>) {
        let _ = self.command_sender.send(PanelCommand::FlashSketch {
            sketch_dir: sketch_dir.into(),
        });
    }

    /// Request a fresh port list
    pub fn refresh_ports(&self) {
        let _ = self.command_sender.send(PanelCommand::RefreshPorts);
    }

    /// Request current session statistics
    pub fn request_stats(&self) {
        let _ = self.command_sender.send(PanelCommand::RequestStats);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(PanelCommand::Shutdown);
    }
}

/// The panel backend that runs on a worker thread
pub struct PanelBackend {
    config: PanelConfig,
    command_receiver: Receiver<PanelCommand>,
    message_sender: Sender<PanelMessage>,
    running: Arc<AtomicBool>,
    /// Pre-opened device, used instead of the serial link when set
    device: Option<Box<dyn ByteStreamDevice>>,
}

impl PanelBackend {
    /// Create a backend with communication channels
    pub fn new(config: PanelConfig) -> (Self, PanelHandle) {
        Self::build(config, None)
    }

    /// Create a backend bound to an already-open device
    ///
    /// `Connect` then attaches to this device instead of opening a serial
    /// port, which lets tests and demos run the full worker loop without
    /// hardware.
    pub fn with_device(
        config: PanelConfig,
        device: Box<dyn ByteStreamDevice>,
    ) -> (Self, PanelHandle) {
        Self::build(config, Some(device))
    }

    fn build(
        config: PanelConfig,
        device: Option<Box<dyn ByteStreamDevice>>,
    ) -> (Self, PanelHandle) {
        let (cmd_tx, cmd_rx) = bounded(256);
        // Bounded for backpressure; samples arrive at 10 Hz, so this is
        // minutes of headroom before anything is dropped
        let (msg_tx, msg_rx) = bounded(4096);

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
            device,
        };

        let handle = PanelHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, handle)
    }

    /// Run the worker loop until shutdown
    pub fn run(self) {
        let mut worker = PanelWorker::new(
            self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
            self.device,
        );
        worker.run();
    }

    /// Get a handle to stop the worker from outside
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
