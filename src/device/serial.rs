//! Serial port implementation of the byte-stream device
//!
//! Wraps a `serialport` handle and adds Arduino Uno auto-detection by USB
//! vendor/product identifiers. The Uno enumerates as VID 0x2341 / PID 0x0043
//! and the panel sketch talks at 9600 baud, 8 data bits, no parity, one stop
//! bit, no flow control.

use crate::error::{PanelError, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use std::io::Read;
use std::time::{Duration, Instant};

use super::ByteStreamDevice;

/// USB vendor identifier of the Arduino Uno
pub const ARDUINO_UNO_VID: u16 = 0x2341;

/// USB product identifier of the Arduino Uno
pub const ARDUINO_UNO_PID: u16 = 0x0043;

/// Default baud rate of the panel sketch
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Fully qualified board name understood by the flashing toolchain
pub const UNO_FQBN: &str = "arduino:avr:uno";

/// A serial port that matched the Uno identifiers
#[derive(Debug, Clone)]
pub struct DetectedBoard {
    /// OS port name (e.g. `/dev/ttyACM0`, `COM3`)
    pub port_name: String,
    /// USB vendor identifier
    pub vid: u16,
    /// USB product identifier
    pub pid: u16,
    /// Product string reported by the USB descriptor, if any
    pub product: Option<String>,
}

impl std::fmt::Display for DetectedBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.product {
            Some(product) => write!(f, "{} ({})", self.port_name, product),
            None => write!(f, "{} ({:04x}:{:04x})", self.port_name, self.vid, self.pid),
        }
    }
}

/// List every serial port visible to the OS, with a display label
pub fn list_ports() -> Vec<(String, String)> {
    let mut out = Vec::new();

    if let Ok(ports) = serialport::available_ports() {
        for p in ports {
            let display = match p.port_type {
                SerialPortType::UsbPort(info) => {
                    let mut parts = Vec::new();
                    if let Some(m) = info.manufacturer {
                        parts.push(m);
                    }
                    if let Some(prod) = info.product {
                        parts.push(prod);
                    }
                    if parts.is_empty() {
                        format!("{}: USB Serial", p.port_name)
                    } else {
                        format!("{}: {}", p.port_name, parts.join(" "))
                    }
                }
                SerialPortType::BluetoothPort => format!("{}: Bluetooth", p.port_name),
                SerialPortType::PciPort => format!("{}: PCI", p.port_name),
                SerialPortType::Unknown => p.port_name.clone(),
            };
            out.push((p.port_name, display));
        }
    }

    out.sort_by(|a, b| a.1.cmp(&b.1));
    out
}

/// Find the first port that matches the Uno vendor/product identifiers
pub fn detect_uno() -> Result<DetectedBoard> {
    let ports = serialport::available_ports()?;

    ports
        .into_iter()
        .find_map(|p| match p.port_type {
            SerialPortType::UsbPort(info)
                if info.vid == ARDUINO_UNO_VID && info.pid == ARDUINO_UNO_PID =>
            {
                Some(DetectedBoard {
                    port_name: p.port_name,
                    vid: info.vid,
                    pid: info.pid,
                    product: info.product,
                })
            }
            _ => None,
        })
        .ok_or_else(|| {
            PanelError::DeviceUnavailable(format!(
                "no serial port matching Arduino Uno {:04x}:{:04x} found",
                ARDUINO_UNO_VID, ARDUINO_UNO_PID
            ))
        })
}

/// A `serialport`-backed byte-stream device
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
    port_name: String,
    /// Bytes received but not yet terminated by a newline
    pending: Vec<u8>,
}

impl SerialDevice {
    /// Open a port with the panel sketch's 9600 8N1 settings
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()?;

        tracing::info!("Opened serial port {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port,
            port_name: port_name.to_string(),
            pending: Vec::new(),
        })
    }

    /// Detect the Uno and open it at the default baud rate
    pub fn open_detected() -> Result<Self> {
        let board = detect_uno()?;
        tracing::info!("Arduino Uno found on {}", board);
        Self::open(&board.port_name, DEFAULT_BAUD_RATE)
    }

    /// The OS port name this device was opened on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl ByteStreamDevice for SerialDevice {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        use std::io::Write;
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;

        loop {
            // A complete line may already be buffered from a previous read
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                let text = String::from_utf8_lossy(&line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                return Ok(Some(text));
            }

            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Ok(None);
            };
            self.port.set_timeout(remaining)?;

            let mut buf = [0u8; 64];
            match self.port.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    return Ok(None)
                }
                Err(e) => return Err(PanelError::Io(e)),
            }
        }
    }

    fn is_readable(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn description(&self) -> String {
        self.port_name.clone()
    }
}
