//! # Uplink Core Library
//!
//! Core functionality for pushing a binary payload to a serial peripheral.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Device configuration (baud rate, data format, flow control, timeouts)
//! - A driver abstraction over the serial device and a `serialport` backend
//! - Single-attempt transfer: write the payload, read back one status byte
//! - Decoding of the receiver's status byte into error flags
//!
//! ## Example
//!
//! ```rust,ignore
//! use uplink_core::prelude::*;
//!
//! let payload = Payload::from_file("firmware.bin")?;
//! let mut controller = TransmissionController::new(SerialDriver::new(), DeviceConfig::default());
//! let report = controller.transmit(&payload)?;
//! println!("sent {} bytes on COM{}", report.bytes_written, report.port);
//! ```

pub mod payload;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::payload::Payload;
    pub use crate::protocol::{
        ComPort, DeviceConfig, ErrorKind, ProtocolError, SerialDriver, StatusFlag, StatusFlags,
        StatusReply, TransferEvent, TransferReport, TransferState, TransmissionController,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
