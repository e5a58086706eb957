//! Serial Uplink Protocol
//!
//! Pushes an opaque payload to the receiver in one blocking write, then reads
//! back a single status byte describing link errors seen on the receiving side.
//!
//! There is no framing and no retry: one call performs exactly one attempt.

pub mod config;
mod controller;
mod error;
pub mod link;
mod port;
pub mod serial;
mod status;

pub use config::{DataBits, DeviceConfig, FlowControl, Parity, StopBits};
pub use controller::{TransferEvent, TransferReport, TransferState, TransmissionController};
pub use error::{ConfigStep, ErrorKind, ProtocolError};
pub use link::{Device, Driver, SerialLink};
pub use port::{ComPort, UNASSIGNED_PORT};
pub use serial::{list_ports, PortInfo, SerialDevice, SerialDriver};
pub use status::{StatusFlag, StatusFlags, StatusReply};

/// Default baud rate for the uplink
pub const DEFAULT_BAUD_RATE: u32 = 230_400;

/// Default read and write timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Default USB transfer size, used for both directions
pub const DEFAULT_USB_BUFFER_SIZE: u32 = 16_384;

/// Number of bytes the receiver answers with after a transfer
pub const STATUS_REPLY_LEN: usize = 1;
