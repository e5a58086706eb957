//! Serial link
//!
//! [`Driver`] and [`Device`] are the seam between the transfer logic and the
//! platform serial driver. [`SerialLink`] owns one open device for the span of
//! a single transfer and closes it exactly once, whichever way the transfer
//! ends.

use std::io;
use std::time::Duration;

use super::{
    ComPort, ConfigStep, DataBits, DeviceConfig, FlowControl, Parity, ProtocolError, StopBits,
};

/// An open serial device handle
pub trait Device {
    /// Raw port number assigned by the OS, or [`super::UNASSIGNED_PORT`]
    fn com_port_number(&mut self) -> io::Result<i32>;

    /// Size the USB IN/OUT transfers
    fn set_usb_parameters(&mut self, in_size: u32, out_size: u32) -> io::Result<()>;

    /// Bound blocking reads and writes
    fn set_timeouts(&mut self, read: Duration, write: Duration) -> io::Result<()>;

    /// Select the handshaking mode
    fn set_flow_control(&mut self, flow: FlowControl) -> io::Result<()>;

    /// Set the line speed
    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()>;

    /// Set the character format
    fn set_data_characteristics(
        &mut self,
        data_bits: DataBits,
        stop_bits: StopBits,
        parity: Parity,
    ) -> io::Result<()>;

    /// Blocking write of `data`, bounded by the write timeout.
    ///
    /// Returns how many bytes the driver accepted; running out of time is not
    /// an error, it shows up as a short count.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Blocking read into `buf`, bounded by the read timeout.
    ///
    /// Returns the number of bytes received, zero if nothing arrived in time.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the handle
    fn close(&mut self);
}

/// Opens devices
pub trait Driver {
    /// Handle type returned by [`open`](Driver::open)
    type Device: Device;

    /// Open the device at position `index` among the available ones
    fn open(&mut self, index: usize) -> io::Result<Self::Device>;
}

/// Exclusive ownership of one open device for one transfer
pub struct SerialLink<D: Device> {
    device: Option<D>,
    port: Option<ComPort>,
}

impl<D: Device> SerialLink<D> {
    /// Open the device at `index` (0 = first available)
    pub fn open<Dr>(driver: &mut Dr, index: usize) -> Result<Self, ProtocolError>
    where
        Dr: Driver<Device = D>,
    {
        let device = driver
            .open(index)
            .map_err(|e| ProtocolError::DeviceOpen(e.to_string()))?;
        tracing::debug!("serial device {} opened", index);
        Ok(Self {
            device: Some(device),
            port: None,
        })
    }

    /// Apply `config` and resolve the assigned port number.
    ///
    /// Steps run in order and stop at the first one the driver rejects. A
    /// rejected step is reported ahead of an unassigned port.
    pub fn configure(&mut self, config: &DeviceConfig) -> Result<ComPort, ProtocolError> {
        config.validate()?;
        let device = self.device_mut()?;

        let raw_port = device
            .com_port_number()
            .map_err(|e| config_error(ConfigStep::PortQuery, e))?;

        device
            .set_usb_parameters(config.usb_in_size, config.usb_out_size)
            .map_err(|e| config_error(ConfigStep::UsbParameters, e))?;
        device
            .set_timeouts(config.read_timeout(), config.write_timeout())
            .map_err(|e| config_error(ConfigStep::Timeouts, e))?;
        device
            .set_flow_control(config.flow_control)
            .map_err(|e| config_error(ConfigStep::FlowControl, e))?;
        device
            .set_baud_rate(config.baud_rate)
            .map_err(|e| config_error(ConfigStep::BaudRate, e))?;
        device
            .set_data_characteristics(config.data_bits, config.stop_bits, config.parity)
            .map_err(|e| config_error(ConfigStep::DataCharacteristics, e))?;

        let port = ComPort::try_from_raw(raw_port)?;
        tracing::debug!(
            "link configured: {} baud, {:?}/{:?}/{:?}, flow {:?}",
            config.baud_rate,
            config.data_bits,
            config.parity,
            config.stop_bits,
            config.flow_control
        );
        self.port = Some(port);
        Ok(port)
    }

    /// Port number resolved by [`configure`](Self::configure)
    pub fn port(&self) -> Option<ComPort> {
        self.port
    }

    /// Write the whole payload in one blocking call; returns the accepted count
    pub fn write(&mut self, payload: &[u8]) -> Result<usize, ProtocolError> {
        self.ensure_configured()?;
        self.device_mut()?
            .write(payload)
            .map_err(|e| ProtocolError::Write(e.to_string()))
    }

    /// Read up to `len` bytes in one blocking call; may return fewer, or none
    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        self.ensure_configured()?;
        let mut buf = vec![0u8; len];
        let received = self
            .device_mut()?
            .read(&mut buf)
            .map_err(|e| ProtocolError::Read(e.to_string()))?;
        buf.truncate(received);
        Ok(buf)
    }

    /// Close the device now instead of at drop
    pub fn close(mut self) {
        self.release();
    }

    fn ensure_configured(&self) -> Result<(), ProtocolError> {
        if self.port.is_none() {
            return Err(ProtocolError::DeviceOpen("link used before configuration".into()));
        }
        Ok(())
    }

    fn device_mut(&mut self) -> Result<&mut D, ProtocolError> {
        self.device
            .as_mut()
            .ok_or_else(|| ProtocolError::DeviceOpen("device already closed".into()))
    }

    fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.close();
            tracing::debug!("serial device closed");
        }
    }
}

impl<D: Device> Drop for SerialLink<D> {
    fn drop(&mut self) {
        self.release();
    }
}

fn config_error(step: ConfigStep, err: io::Error) -> ProtocolError {
    tracing::debug!("configuration step '{}' rejected: {}", step, err);
    ProtocolError::DeviceConfig {
        step,
        reason: err.to_string(),
    }
}
