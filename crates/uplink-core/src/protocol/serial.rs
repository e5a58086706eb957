//! Serial port handling
//!
//! [`Driver`] backend built on the `serialport` crate.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::collections::HashMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::{
    DataBits, Device, Driver, FlowControl, Parity, StopBits, DEFAULT_BAUD_RATE,
    DEFAULT_TIMEOUT_MS, UNASSIGNED_PORT,
};

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,

    /// USB product ID (if USB device)
    pub pid: Option<u16>,

    /// Manufacturer name (if available)
    pub manufacturer: Option<String>,

    /// Serial number (if available)
    pub serial_number: Option<String>,
}

impl PortInfo {
    fn bare(name: String) -> Self {
        Self {
            name,
            vid: None,
            pid: None,
            manufacturer: None,
            serial_number: None,
        }
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb_info) => Self {
                name: info.port_name,
                vid: Some(usb_info.vid),
                pid: Some(usb_info.pid),
                manufacturer: usb_info.manufacturer,
                serial_number: usb_info.serial_number,
            },
            _ => Self::bare(info.port_name),
        }
    }
}

/// Helper used to sort port names so that:
///  - ttyACM* ports come first (sorted numerically by suffix)
///  - then ttyUSB* ports (sorted numerically)
///  - then other ports (sorted by name, COM ports numerically)
fn port_sort_key(name: &str) -> (u8, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    if let Some(rest) = basename.strip_prefix("ttyACM") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (0, num, basename.to_string());
    }
    if let Some(rest) = basename.strip_prefix("ttyUSB") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (1, num, basename.to_string());
    }
    if let Some(rest) = basename.strip_prefix("COM") {
        if let Ok(num) = rest.parse::<usize>() {
            return (2, num, basename.to_string());
        }
    }
    (3, 0, basename.to_string())
}

/// Port number carried by a port name: the trailing decimal digits of its
/// basename (`COM7` -> 7, `/dev/ttyUSB0` -> 0), or [`UNASSIGNED_PORT`].
fn port_number_from_name(name: &str) -> i32 {
    let basename = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);
    let prefix = basename.trim_end_matches(|c: char| c.is_ascii_digit());
    basename[prefix.len()..]
        .parse::<i32>()
        .unwrap_or(UNASSIGNED_PORT)
}

/// List all available serial ports, with /dev fallbacks and deterministic ordering
pub fn list_ports() -> Vec<PortInfo> {
    let mut map: HashMap<String, PortInfo> = HashMap::new();
    for info in serialport::available_ports().unwrap_or_default() {
        let p = PortInfo::from(info);
        map.entry(p.name.clone()).or_insert(p);
    }

    // Linux-only: Add /dev/ttyACM* and /dev/ttyUSB* entries if present but not found by API
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        for entry in entries.flatten() {
            if let Some(fname) = entry.file_name().to_str() {
                if fname.starts_with("ttyACM") || fname.starts_with("ttyUSB") {
                    let full = format!("/dev/{}", fname);
                    map.entry(full.clone())
                        .or_insert_with(|| PortInfo::bare(full));
                }
            }
        }
    }

    let mut v: Vec<PortInfo> = map.into_values().collect();
    v.sort_by_key(|p| port_sort_key(&p.name));
    v
}

/// Opens serial ports through the `serialport` crate
#[derive(Debug, Clone, Default)]
pub struct SerialDriver {
    port_name: Option<String>,
}

impl SerialDriver {
    /// Driver that picks devices from [`list_ports`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver pinned to one named port; only index 0 exists
    pub fn with_port(name: impl Into<String>) -> Self {
        Self {
            port_name: Some(name.into()),
        }
    }

    fn resolve(&self, index: usize) -> io::Result<String> {
        if let Some(name) = &self.port_name {
            return match index {
                0 => Ok(name.clone()),
                _ => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no device at index {} (pinned to {})", index, name),
                )),
            };
        }

        let ports = list_ports();
        tracing::debug!("found {} serial port(s)", ports.len());
        ports
            .into_iter()
            .nth(index)
            .map(|p| p.name)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no serial device found at index {}", index),
                )
            })
    }
}

impl Driver for SerialDriver {
    type Device = SerialDevice;

    fn open(&mut self, index: usize) -> io::Result<SerialDevice> {
        let name = self.resolve(index)?;
        let port = serialport::new(&name, DEFAULT_BAUD_RATE)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()
            .map_err(io::Error::from)?;
        tracing::info!("opened serial port {}", name);
        Ok(SerialDevice::new(name, port))
    }
}

/// An open `serialport` handle
pub struct SerialDevice {
    name: String,
    port: Option<Box<dyn SerialPort>>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl SerialDevice {
    fn new(name: String, port: Box<dyn SerialPort>) -> Self {
        Self {
            name,
            port: Some(port),
            read_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            write_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port closed"))
    }
}

impl Device for SerialDevice {
    fn com_port_number(&mut self) -> io::Result<i32> {
        Ok(port_number_from_name(&self.name))
    }

    fn set_usb_parameters(&mut self, in_size: u32, out_size: u32) -> io::Result<()> {
        if in_size == 0 || out_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "USB transfer size must be non-zero",
            ));
        }
        // serialport has no knob for USB transfer sizes; the OS driver picks them
        tracing::debug!(
            "USB transfer sizes {}/{} requested, left to the OS driver",
            in_size,
            out_size
        );
        Ok(())
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> io::Result<()> {
        self.read_timeout = read;
        self.write_timeout = write;
        self.port()?.set_timeout(write).map_err(io::Error::from)
    }

    fn set_flow_control(&mut self, flow: FlowControl) -> io::Result<()> {
        self.port()?
            .set_flow_control(flow.into())
            .map_err(io::Error::from)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        self.port()?
            .set_baud_rate(baud_rate)
            .map_err(io::Error::from)
    }

    fn set_data_characteristics(
        &mut self,
        data_bits: DataBits,
        stop_bits: StopBits,
        parity: Parity,
    ) -> io::Result<()> {
        let port = self.port()?;
        port.set_data_bits(data_bits.into()).map_err(io::Error::from)?;
        port.set_stop_bits(stop_bits.into()).map_err(io::Error::from)?;
        port.set_parity(parity.into()).map_err(io::Error::from)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let deadline = Instant::now() + self.write_timeout;
        let port = self.port()?;

        let mut written = 0;
        while written < data.len() {
            // Each driver call only gets what is left of the overall budget
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            port.set_timeout(remaining).map_err(io::Error::from)?;

            match port.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = self.read_timeout;
        let port = self.port()?;
        port.set_timeout(timeout).map_err(io::Error::from)?;

        loop {
            match port.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(0),
                Err(e) => return Err(e),
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::debug!("closed serial port {}", self.name);
        }
    }
}
