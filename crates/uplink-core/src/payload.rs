//! Payload loading
//!
//! The payload is opaque: it is read whole into memory and sent as-is.

use std::fs;
use std::ops::Deref;
use std::path::Path;

use crate::protocol::ProtocolError;

/// Bytes to transmit, loaded before the link is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Read the whole file at `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ProtocolError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded {} byte payload from {}", bytes.len(), path.display());
        Ok(Self(bytes))
    }

    /// The payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Deref for Payload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}
