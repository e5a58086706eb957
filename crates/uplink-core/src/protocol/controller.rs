//! Transfer orchestration
//!
//! Runs one transfer from start to finish:
//!
//! ```text
//! Idle -> LinkOpening -> LinkConfigured -> Writing -> AwaitingStatus -> Decoding -> Success
//!              \               \               \             \               \
//!               +---------------+---------------+-------------+---------------+-> Failed(kind)
//! ```
//!
//! Nothing is retried. A link that was opened is closed before the outcome is
//! returned.

use super::{
    ComPort, DeviceConfig, Driver, ErrorKind, ProtocolError, SerialLink, StatusReply,
    STATUS_REPLY_LEN,
};

/// Transfer progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// No transfer started
    Idle,
    /// Opening the device
    LinkOpening,
    /// Device open and configured
    LinkConfigured,
    /// Payload write in flight
    Writing,
    /// Waiting for the status byte
    AwaitingStatus,
    /// Interpreting the status byte
    Decoding,
    /// Receiver reported a clean transfer
    Success,
    /// Transfer ended with an error
    Failed(ErrorKind),
}

impl TransferState {
    /// True for `Success` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Success | TransferState::Failed(_))
    }
}

/// Progress notifications passed to the observer of
/// [`TransmissionController::transmit_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// The link is configured on this port; the payload is about to be sent
    PortAssigned(ComPort),
    /// The whole payload was accepted; the status byte is about to be read
    PayloadWritten {
        /// Bytes accepted by the driver
        bytes: usize,
    },
}

/// Result of a clean transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// Port the device was opened on
    pub port: ComPort,
    /// Bytes accepted by the driver
    pub bytes_written: usize,
    /// Reply from the receiver (always clean in a report)
    pub status: StatusReply,
}

/// Drives a single payload transfer over a [`Driver`]
pub struct TransmissionController<Dr: Driver> {
    driver: Dr,
    config: DeviceConfig,
    device_index: usize,
    state: TransferState,
}

impl<Dr: Driver> TransmissionController<Dr> {
    /// Controller using the first available device
    pub fn new(driver: Dr, config: DeviceConfig) -> Self {
        Self {
            driver,
            config,
            device_index: 0,
            state: TransferState::Idle,
        }
    }

    /// Use the device at `index` instead of the first one
    pub fn with_device_index(mut self, index: usize) -> Self {
        self.device_index = index;
        self
    }

    /// State reached by the last transfer
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Send `payload` and check the receiver's status byte
    pub fn transmit(&mut self, payload: &[u8]) -> Result<TransferReport, ProtocolError> {
        self.transmit_with(payload, |_| {})
    }

    /// Like [`transmit`](Self::transmit), reporting progress to `observer`
    pub fn transmit_with<F>(
        &mut self,
        payload: &[u8],
        mut observer: F,
    ) -> Result<TransferReport, ProtocolError>
    where
        F: FnMut(TransferEvent),
    {
        self.state = TransferState::Idle;
        let result = self.run(payload, &mut observer);
        let terminal = match &result {
            Ok(_) => TransferState::Success,
            Err(e) => TransferState::Failed(e.kind()),
        };
        self.transition(terminal);
        result
    }

    fn run(
        &mut self,
        payload: &[u8],
        observer: &mut dyn FnMut(TransferEvent),
    ) -> Result<TransferReport, ProtocolError> {
        self.transition(TransferState::LinkOpening);
        let mut link = SerialLink::open(&mut self.driver, self.device_index)?;
        let port = link.configure(&self.config)?;
        self.transition(TransferState::LinkConfigured);
        tracing::info!("device opened on COM{}", port);
        observer(TransferEvent::PortAssigned(port));

        self.transition(TransferState::Writing);
        let written = link.write(payload)?;
        // A short count without a driver error means the write timed out
        if written != payload.len() {
            tracing::warn!("short write: {} of {} bytes", written, payload.len());
            return Err(ProtocolError::WriteTimeout {
                written,
                expected: payload.len(),
            });
        }
        observer(TransferEvent::PayloadWritten { bytes: written });

        self.transition(TransferState::AwaitingStatus);
        let reply = link.read(STATUS_REPLY_LEN)?;
        let byte = *reply.first().ok_or(ProtocolError::NoStatusByte)?;
        link.close();

        self.transition(TransferState::Decoding);
        let status = StatusReply(byte);
        if !status.is_clean() {
            tracing::warn!("receiver reported status {:#04x}", byte);
            return Err(ProtocolError::Status(status.flags()));
        }

        tracing::info!("transferred {} bytes on COM{}", written, port);
        Ok(TransferReport {
            port,
            bytes_written: written,
            status,
        })
    }

    fn transition(&mut self, next: TransferState) {
        tracing::debug!("transfer state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
