//! Stream traits
//!
//! The save path writes through a [`Writer`]; the load path reads the
//! preamble sequentially and the payload positionally through a [`Reader`].

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{NpyError, Result};

/// Byte source for loading arrays
///
/// Implementations must be shareable: a deferred load keeps the reader alive
/// until the payload is evaluated.
pub trait Reader: Send + Sync {
    /// Whether the underlying source was opened successfully
    fn is_open(&self) -> bool;

    /// Human-readable name used in error messages
    fn label(&self) -> String;

    /// Fill `buf` from the current position, advancing it
    fn read(&self, buf: &mut [u8]) -> Result<()>;

    /// Read exactly `n` bytes starting at `offset` without moving the position
    fn read_at(&self, n: usize, offset: u64) -> Result<Bytes>;
}

/// Byte sink for saving arrays
pub trait Writer {
    fn is_open(&self) -> bool;

    fn label(&self) -> String;

    /// Write all of `data`
    fn write(&mut self, data: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Writer for Vec<u8> {
    fn is_open(&self) -> bool {
        true
    }

    fn label(&self) -> String {
        "memory buffer".to_string()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.extend_from_slice(data);
        Ok(())
    }
}

/// Reader over an in-memory buffer
pub struct MemoryReader {
    data: Bytes,
    position: Mutex<usize>,
}

impl MemoryReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: Mutex::new(0),
        }
    }

    /// Current sequential read position
    pub fn position(&self) -> usize {
        *self.position.lock()
    }
}

impl Reader for MemoryReader {
    fn is_open(&self) -> bool {
        true
    }

    fn label(&self) -> String {
        format!("memory buffer ({} bytes)", self.data.len())
    }

    fn read(&self, buf: &mut [u8]) -> Result<()> {
        let mut position = self.position.lock();
        let end = *position + buf.len();
        if end > self.data.len() {
            return Err(NpyError::ShortRead {
                requested: buf.len(),
            });
        }
        buf.copy_from_slice(&self.data[*position..end]);
        *position = end;
        Ok(())
    }

    fn read_at(&self, n: usize, offset: u64) -> Result<Bytes> {
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(n).map(|end| start..end))
            .filter(|range| range.end <= self.data.len());

        match range {
            Some(range) => Ok(self.data.slice(range)),
            None => Err(NpyError::Read(format!(
                "Unable to read {} bytes at offset {} from {}",
                n,
                offset,
                self.label()
            ))),
        }
    }
}
