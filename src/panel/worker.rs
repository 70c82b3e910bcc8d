//! Panel worker loop
//!
//! Runs on its own thread and owns the device handle, the session recorder,
//! and the flasher. The loop alternates between draining pending commands and
//! taking one poll tick when a session is collecting, paced at the configured
//! interval. The per-tick read timeout stays below the interval (the
//! configuration clamps it), so a silent device cannot stall the cadence.

use crate::config::PanelConfig;
use crate::device::{ByteStreamDevice, Command, SerialDevice};
use crate::flash::{FlashRequest, SketchFlasher};
use crate::recorder::SessionRecorder;
use crate::sched::Pacer;
use crate::summary;
use crate::types::{ConnectionStatus, LedColor};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{PanelCommand, PanelMessage};

/// Interval between unsolicited statistics updates
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// The worker that owns the device and drives the acquisition loop
pub struct PanelWorker {
    config: PanelConfig,
    command_rx: Receiver<PanelCommand>,
    message_tx: Sender<PanelMessage>,
    running: Arc<AtomicBool>,
    /// The single owner of the device handle
    device: Option<Box<dyn ByteStreamDevice>>,
    /// Port the device was opened on; absent for injected devices
    port_name: Option<String>,
    recorder: SessionRecorder,
    flasher: SketchFlasher,
    connection_status: ConnectionStatus,
    pacer: Pacer,
    last_stats_time: Instant,
}

impl PanelWorker {
    /// Create a worker; `device` pre-attaches an already-open handle
    pub fn new(
        config: PanelConfig,
        command_rx: Receiver<PanelCommand>,
        message_tx: Sender<PanelMessage>,
        running: Arc<AtomicBool>,
        device: Option<Box<dyn ByteStreamDevice>>,
    ) -> Self {
        let pacer = Pacer::new(config.poll_interval());
        let flasher = SketchFlasher::new(&config.flash.cli_path);

        Self {
            config,
            command_rx,
            message_tx,
            running,
            device,
            port_name: None,
            recorder: SessionRecorder::new(),
            flasher,
            connection_status: ConnectionStatus::Disconnected,
            pacer,
            last_stats_time: Instant::now(),
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Panel worker started");

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();

            if self.recorder.is_collecting() {
                self.poll_once();

                if self.last_stats_time.elapsed() >= STATS_INTERVAL {
                    self.send_stats();
                    self.last_stats_time = Instant::now();
                }
            }

            self.pacer.pace();
        }

        // An interrupted session is still closed and summarized on the way out
        if self.recorder.is_collecting() {
            self.handle_stop_logging();
        }

        let _ = self.message_tx.send(PanelMessage::Shutdown);
        tracing::info!("Panel worker stopped");
    }

    /// Drain pending commands without blocking
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: PanelCommand) {
        match cmd {
            PanelCommand::Connect { port } => self.handle_connect(port),
            PanelCommand::Disconnect => self.handle_disconnect(),
            PanelCommand::SetLed { color, on } => self.handle_set_led(color, on),
            PanelCommand::SetServo { angle } => {
                self.send_device_command(&Command::Servo(angle));
            }
            PanelCommand::SensorPower { on } => {
                let command = if on {
                    Command::SensorOn
                } else {
                    Command::SensorOff
                };
                self.send_device_command(&command);
            }
            PanelCommand::StartLogging { filename_hint } => {
                self.handle_start_logging(filename_hint);
            }
            PanelCommand::StopLogging => self.handle_stop_logging(),
            PanelCommand::FlashSketch { sketch_dir } => self.handle_flash(sketch_dir),
            PanelCommand::RefreshPorts => {
                let _ = self
                    .message_tx
                    .send(PanelMessage::PortList(crate::device::list_ports()));
            }
            PanelCommand::RequestStats => self.send_stats(),
            PanelCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Handle connect: attach the injected device or open the serial port
    fn handle_connect(&mut self, port: Option<String>) {
        if self.device.is_some() {
            // A pre-attached or already-open device stays connected
            self.update_connection_status(ConnectionStatus::Connected);
            return;
        }

        self.update_connection_status(ConnectionStatus::Connecting);

        let opened = match &port {
            Some(name) => SerialDevice::open(name, self.config.serial.baud_rate),
            None => SerialDevice::open_detected(),
        };

        match opened {
            Ok(device) => {
                self.port_name = Some(device.port_name().to_string());
                self.device = Some(Box::new(device));
                self.update_connection_status(ConnectionStatus::Connected);
                tracing::info!("Connected on {}", self.port_name.as_deref().unwrap_or("?"));
            }
            Err(e) => {
                self.update_connection_status(ConnectionStatus::Error);
                let error_msg = format!("Failed to connect: {}", e);
                tracing::error!("{}", error_msg);
                let _ = self
                    .message_tx
                    .send(PanelMessage::ConnectionError(error_msg));
            }
        }
    }

    /// Handle disconnect, closing any active session first
    fn handle_disconnect(&mut self) {
        if self.recorder.is_collecting() {
            self.handle_stop_logging();
        }

        self.device = None;
        self.port_name = None;
        self.update_connection_status(ConnectionStatus::Disconnected);
        tracing::info!("Disconnected from board");
    }

    fn handle_set_led(&mut self, color: LedColor, on: bool) {
        let command = if on {
            Command::LedOn(color)
        } else {
            Command::LedOff(color)
        };
        self.send_device_command(&command);
    }

    /// Start a recording session in the configured data directory
    fn handle_start_logging(&mut self, filename_hint: Option<String>) {
        let data_dir = self.config.collection.data_dir.clone();
        let Some(device) = self.device.as_mut() else {
            let _ = self
                .message_tx
                .send(PanelMessage::Status("Not connected".to_string()));
            return;
        };

        match self
            .recorder
            .start(device.as_mut(), &data_dir, filename_hint.as_deref())
        {
            Ok(info) => {
                let _ = self
                    .message_tx
                    .send(PanelMessage::LoggingStarted { path: info.path });
            }
            Err(e) => {
                tracing::warn!("Failed to start logging: {}", e);
                let _ = self
                    .message_tx
                    .send(PanelMessage::Status(format!("Failed to start logging: {}", e)));
            }
        }
    }

    /// Stop the session and summarize its store synchronously
    ///
    /// Summarization runs on this thread; at the 10 Hz cadence a session is
    /// small enough that the loop stall is not observable from outside.
    fn handle_stop_logging(&mut self) {
        let Some(device) = self.device.as_mut() else {
            let _ = self
                .message_tx
                .send(PanelMessage::Status("Not connected".to_string()));
            return;
        };

        let closed = match self.recorder.stop(device.as_mut()) {
            Ok(closed) => closed,
            Err(e) => {
                let _ = self
                    .message_tx
                    .send(PanelMessage::Status(format!("Failed to stop logging: {}", e)));
                return;
            }
        };

        self.send_stats();

        let bins = self.config.collection.histogram_bins;
        match summary::summarize(&closed.info.path, bins) {
            Ok(artifacts) => {
                let message = format!(
                    "Session {} complete: {} samples",
                    closed.info.id, closed.samples
                );
                let _ = self.message_tx.send(PanelMessage::SessionComplete {
                    success: true,
                    message,
                    artifacts: Some(artifacts),
                });
            }
            Err(e) => {
                tracing::warn!("Summarization failed for {}: {}", closed.info.id, e);
                let _ = self.message_tx.send(PanelMessage::SessionComplete {
                    success: false,
                    message: format!("Session {} closed without summary: {}", closed.info.id, e),
                    artifacts: None,
                });
            }
        }
    }

    /// Flash a sketch, releasing the serial port for the upload tool
    fn handle_flash(&mut self, sketch_dir: PathBuf) {
        if self.recorder.is_collecting() {
            let _ = self.message_tx.send(PanelMessage::FlashComplete {
                success: false,
                message: "Cannot flash while a session is collecting".to_string(),
            });
            return;
        }

        let Some(port) = self.port_name.clone() else {
            let _ = self.message_tx.send(PanelMessage::FlashComplete {
                success: false,
                message: "No serial port to flash over".to_string(),
            });
            return;
        };

        // The upload tool needs exclusive port access
        self.device = None;
        self.update_connection_status(ConnectionStatus::Disconnected);

        let request = FlashRequest {
            sketch_dir,
            port: port.clone(),
            fqbn: self.config.flash.board.clone(),
        };
        let message_tx = self.message_tx.clone();
        let outcome = self.flasher.flash(&request, move |line| {
            let _ = message_tx.send(PanelMessage::FlashProgress(line));
        });

        let _ = self.message_tx.send(PanelMessage::FlashComplete {
            success: outcome.success,
            message: outcome.message,
        });

        // Reattach to the board, which reboots after an upload
        self.handle_connect(Some(port));
    }

    /// One poll tick of the active session
    fn poll_once(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        let timeout = self.config.read_timeout();
        if let Some(sample) = self.recorder.poll_tick(device.as_mut(), timeout) {
            let _ = self
                .message_tx
                .try_send(PanelMessage::SampleRecorded { value: sample.value });
        }
    }

    /// Encode and send a protocol command, surfacing failures as status lines
    fn send_device_command(&mut self, command: &Command) {
        let Some(device) = self.device.as_mut() else {
            let _ = self
                .message_tx
                .send(PanelMessage::Status("Not connected".to_string()));
            return;
        };

        if let Err(e) = device.send_command(command) {
            tracing::warn!("Command {} failed: {}", command, e);
            let _ = self
                .message_tx
                .send(PanelMessage::Status(format!("Command {} failed: {}", command, e)));
        }
    }

    fn update_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
        let _ = self
            .message_tx
            .send(PanelMessage::ConnectionStatus(status));
    }

    fn send_stats(&mut self) {
        let _ = self
            .message_tx
            .try_send(PanelMessage::Stats(self.recorder.stats().clone()));
    }
}
