//! Console lines printed for each stage and outcome of a transfer

use uplink_core::protocol::{ProtocolError, TransferEvent};

/// Line printed when a transfer finishes cleanly
pub const SUCCESS_LINE: &str = "Data transmission completed successfully.";

/// Line printed for a progress event
pub fn event_line(event: &TransferEvent) -> String {
    match event {
        TransferEvent::PortAssigned(port) => {
            format!("Info: device opened on COM{}. Transmitting data...", port)
        }
        TransferEvent::PayloadWritten { .. } => {
            "Info: data transmitted. Reading status byte...".to_string()
        }
    }
}

/// Line printed for a failed transfer
pub fn error_line(err: &ProtocolError) -> String {
    match err {
        ProtocolError::FileOpen { path, .. } => {
            format!("Error: cannot open source file '{}'!", path.display())
        }
        ProtocolError::DeviceOpen(cause) => {
            format!("Error: cannot open serial device! ({})", cause)
        }
        ProtocolError::DeviceConfig { step, reason } => {
            format!("Error: cannot open serial device! ({}: {})", step, reason)
        }
        ProtocolError::InvalidConfig(reason) => {
            format!("Error: cannot open serial device! (invalid configuration: {})", reason)
        }
        ProtocolError::InvalidPort => "Error: invalid COM port!".to_string(),
        ProtocolError::WriteTimeout { .. } => {
            "Error: timeout during data transmission!".to_string()
        }
        ProtocolError::Write(cause) => format!("Error: data transmission failed! ({})", cause),
        ProtocolError::Read(cause) => format!("Error: cannot read status byte! ({})", cause),
        ProtocolError::NoStatusByte => "Error: no status byte received!".to_string(),
        ProtocolError::Status(flags) => {
            format!("Data transmission completed with errors. ({})", flags.summary())
        }
    }
}
