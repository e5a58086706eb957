//! Protocol errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::StatusFlags;

/// Configuration sub-step that was being applied when the driver refused it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    /// Querying the assigned COM port number
    PortQuery,
    /// USB transfer buffer sizing
    UsbParameters,
    /// Read/write timeouts
    Timeouts,
    /// Hardware or software flow control
    FlowControl,
    /// Baud rate
    BaudRate,
    /// Data bits, stop bits and parity
    DataCharacteristics,
}

impl fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigStep::PortQuery => "port query",
            ConfigStep::UsbParameters => "USB parameters",
            ConfigStep::Timeouts => "timeouts",
            ConfigStep::FlowControl => "flow control",
            ConfigStep::BaudRate => "baud rate",
            ConfigStep::DataCharacteristics => "data characteristics",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during a transfer
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload file missing or unreadable
    #[error("cannot open source file '{}': {source}", path.display())]
    FileOpen {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// No device present, or the driver refused to open it
    #[error("cannot open serial device: {0}")]
    DeviceOpen(String),

    /// The driver rejected a configuration sub-step
    #[error("cannot configure serial device ({step}): {reason}")]
    DeviceConfig {
        /// Step that failed
        step: ConfigStep,
        /// Driver message
        reason: String,
    },

    /// Device opened but no usable port number assigned
    #[error("invalid COM port")]
    InvalidPort,

    /// Fewer bytes accepted than the payload holds
    #[error("timeout during data transmission: {written} of {expected} bytes written")]
    WriteTimeout {
        /// Bytes accepted by the driver
        written: usize,
        /// Payload length
        expected: usize,
    },

    /// Driver-level write failure
    #[error("data transmission failed: {0}")]
    Write(String),

    /// Driver-level read failure
    #[error("cannot read status byte: {0}")]
    Read(String),

    /// The read finished without a byte
    #[error("no status byte received")]
    NoStatusByte,

    /// The receiver answered with a nonzero status byte
    #[error("data transmission completed with errors ({0})")]
    Status(StatusFlags),

    /// Configuration values no driver can apply
    #[error("invalid device configuration: {0}")]
    InvalidConfig(String),
}

/// Flat classification of [`ProtocolError`], used to tag failed transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`ProtocolError::FileOpen`]
    FileOpen,
    /// Open or configuration failure
    DeviceOpen,
    /// See [`ProtocolError::InvalidPort`]
    InvalidPort,
    /// See [`ProtocolError::WriteTimeout`]
    WriteTimeout,
    /// See [`ProtocolError::Write`]
    Write,
    /// See [`ProtocolError::Read`]
    Read,
    /// See [`ProtocolError::NoStatusByte`]
    NoStatusByte,
    /// Nonzero status byte, with its decoded flags
    Status(StatusFlags),
}

impl ProtocolError {
    /// Classify this error.
    ///
    /// A rejected configuration sub-step and an unusable configuration are both
    /// reported as a device open failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::FileOpen { .. } => ErrorKind::FileOpen,
            ProtocolError::DeviceOpen(_)
            | ProtocolError::DeviceConfig { .. }
            | ProtocolError::InvalidConfig(_) => ErrorKind::DeviceOpen,
            ProtocolError::InvalidPort => ErrorKind::InvalidPort,
            ProtocolError::WriteTimeout { .. } => ErrorKind::WriteTimeout,
            ProtocolError::Write(_) => ErrorKind::Write,
            ProtocolError::Read(_) => ErrorKind::Read,
            ProtocolError::NoStatusByte => ErrorKind::NoStatusByte,
            ProtocolError::Status(flags) => ErrorKind::Status(*flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusFlag;

    #[test]
    fn test_config_failures_classify_as_device_open() {
        let err = ProtocolError::DeviceConfig {
            step: ConfigStep::BaudRate,
            reason: "rejected".into(),
        };
        assert_eq!(err.kind(), ErrorKind::DeviceOpen);
        assert_eq!(
            ProtocolError::InvalidConfig("zero baud".into()).kind(),
            ErrorKind::DeviceOpen
        );
    }

    #[test]
    fn test_status_kind_keeps_flags() {
        let flags = StatusFlags::from_bits(0x11);
        let err = ProtocolError::Status(flags);
        match err.kind() {
            ErrorKind::Status(f) => {
                assert!(f.contains(StatusFlag::Framing));
                assert!(f.contains(StatusFlag::Overrun));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_messages_are_distinct() {
        let errors = [
            ProtocolError::DeviceOpen("x".into()),
            ProtocolError::InvalidPort,
            ProtocolError::WriteTimeout {
                written: 7,
                expected: 10,
            },
            ProtocolError::Write("x".into()),
            ProtocolError::Read("x".into()),
            ProtocolError::NoStatusByte,
            ProtocolError::Status(StatusFlags::from_bits(0x01)),
        ];
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_write_timeout_display() {
        let err = ProtocolError::WriteTimeout {
            written: 7,
            expected: 10,
        };
        assert_eq!(
            err.to_string(),
            "timeout during data transmission: 7 of 10 bytes written"
        );
    }
}
