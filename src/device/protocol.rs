//! Wire protocol for the panel sketch
//!
//! The board speaks a single-byte command scheme with newline-terminated text
//! responses:
//!
//! - `'o'` / `'c'` enable and disable sensor acquisition
//! - `'R'`/`'Y'`/`'B'` turn an LED on, `'r'`/`'y'`/`'b'` turn it off
//! - a decimal number followed by `'\n'` positions the servo (0-180 degrees)
//!
//! While acquisition is enabled the board pushes newline-terminated lines:
//! either a decimal sensor reading or one of the literal acknowledgement
//! tokens `"ON"` / `"OFF"`.

use crate::types::LedColor;

/// Byte that enables sensor acquisition
pub const SENSOR_ON: u8 = b'o';

/// Byte that disables sensor acquisition
pub const SENSOR_OFF: u8 = b'c';

/// Maximum servo angle accepted by the sketch
pub const SERVO_MAX_ANGLE: u8 = 180;

/// A command the host can send to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enable sensor acquisition mode
    SensorOn,
    /// Disable sensor acquisition mode
    SensorOff,
    /// Turn an LED on
    LedOn(LedColor),
    /// Turn an LED off
    LedOff(LedColor),
    /// Position the servo, clamped to [0, 180] degrees
    Servo(u8),
}

impl Command {
    /// Encode the command as the bytes written to the device
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::SensorOn => vec![SENSOR_ON],
            Command::SensorOff => vec![SENSOR_OFF],
            Command::LedOn(color) => vec![match color {
                LedColor::Red => b'R',
                LedColor::Yellow => b'Y',
                LedColor::Blue => b'B',
            }],
            Command::LedOff(color) => vec![match color {
                LedColor::Red => b'r',
                LedColor::Yellow => b'y',
                LedColor::Blue => b'b',
            }],
            Command::Servo(angle) => {
                format!("{}\n", (*angle).min(SERVO_MAX_ANGLE)).into_bytes()
            }
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SensorOn => write!(f, "sensor on"),
            Command::SensorOff => write!(f, "sensor off"),
            Command::LedOn(color) => write!(f, "{} LED on", color),
            Command::LedOff(color) => write!(f, "{} LED off", color),
            Command::Servo(angle) => write!(f, "servo to {}", angle),
        }
    }
}

/// A non-numeric line acknowledging a command rather than reporting a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    /// Acquisition was enabled
    On,
    /// Acquisition was disabled
    Off,
}

impl StatusToken {
    /// Recognize a trimmed line as a status token, if it is one
    pub fn from_line(line: &str) -> Option<Self> {
        match line {
            "ON" => Some(StatusToken::On),
            "OFF" => Some(StatusToken::Off),
            _ => None,
        }
    }
}
