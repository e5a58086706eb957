//! Assigned COM port number

use std::fmt;

use super::ProtocolError;

/// Raw value a driver reports when no port number has been assigned
pub const UNASSIGNED_PORT: i32 = -1;

/// Logical port number the OS assigned to the opened device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComPort(u32);

impl ComPort {
    /// Turn the raw driver value into a port number.
    ///
    /// [`UNASSIGNED_PORT`], or any other negative value, is an invalid port.
    pub fn try_from_raw(raw: i32) -> Result<Self, ProtocolError> {
        u32::try_from(raw)
            .map(ComPort)
            .map_err(|_| ProtocolError::InvalidPort)
    }

    /// The port number
    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_invalid() {
        assert!(matches!(
            ComPort::try_from_raw(UNASSIGNED_PORT),
            Err(ProtocolError::InvalidPort)
        ));
        assert!(ComPort::try_from_raw(i32::MIN).is_err());
    }

    #[test]
    fn test_assigned_port() {
        let port = ComPort::try_from_raw(7).unwrap();
        assert_eq!(port.number(), 7);
        assert_eq!(port.to_string(), "7");
        assert_eq!(ComPort::try_from_raw(0).unwrap().number(), 0);
    }
}
