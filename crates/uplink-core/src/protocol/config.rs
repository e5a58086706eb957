//! Device configuration
//!
//! The link parameters are fixed by the receiver: 230400 baud, 8 data bits,
//! even parity, one stop bit and RTS/CTS handshaking. They can still be
//! overridden from a JSON file for bench setups.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::{ProtocolError, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS, DEFAULT_USB_BUFFER_SIZE};

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBits {
    /// 5 bits
    Five,
    /// 6 bits
    Six,
    /// 7 bits
    Seven,
    /// 8 bits
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    /// One stop bit
    One,
    /// Two stop bits
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    /// No handshaking
    None,
    /// XON/XOFF
    Software,
    /// RTS/CTS handshaking
    Hardware,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Serial link parameters, applied once before any I/O
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Baud rate
    pub baud_rate: u32,

    /// Data bits per character
    pub data_bits: DataBits,

    /// Stop bits
    pub stop_bits: StopBits,

    /// Parity
    pub parity: Parity,

    /// Flow control
    pub flow_control: FlowControl,

    /// USB IN transfer size in bytes
    pub usb_in_size: u32,

    /// USB OUT transfer size in bytes
    pub usb_out_size: u32,

    /// Write timeout in milliseconds
    pub write_timeout_ms: u64,

    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::Even,
            flow_control: FlowControl::Hardware,
            usb_in_size: DEFAULT_USB_BUFFER_SIZE,
            usb_out_size: DEFAULT_USB_BUFFER_SIZE,
            write_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl DeviceConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProtocolError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let config: DeviceConfig =
            serde_json::from_str(json).map_err(|e| ProtocolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no driver can apply
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.baud_rate == 0 {
            return Err(ProtocolError::InvalidConfig("baud rate must be non-zero".into()));
        }
        if self.usb_in_size == 0 || self.usb_out_size == 0 {
            return Err(ProtocolError::InvalidConfig(
                "USB transfer sizes must be non-zero".into(),
            ));
        }
        if self.write_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ProtocolError::InvalidConfig("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    /// Write timeout as a [`Duration`]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Read timeout as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
