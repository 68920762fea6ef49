//! Deferred loading
//!
//! Loading parses the preamble eagerly but leaves the payload on disk. The
//! result is a [`PendingArray`] whose [`LoadNode`] captures everything the
//! evaluation engine needs to fetch the bytes later.

use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::array::{HostArray, Layout};
use crate::dtype::{self, Dtype};
use crate::error::{NpyError, Result};
use crate::io::Reader;

/// Execution target for a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

/// Pending payload read: reader, offset and byte order fix-up
#[derive(Clone)]
pub struct LoadNode {
    pub device: Device,
    pub reader: Arc<dyn Reader>,
    pub offset: u64,
    pub swap_endianness: bool,
}

impl fmt::Debug for LoadNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadNode")
            .field("device", &self.device)
            .field("reader", &self.reader.label())
            .field("offset", &self.offset)
            .field("swap_endianness", &self.swap_endianness)
            .finish()
    }
}

impl LoadNode {
    /// Read `count` elements of `dtype` and convert them to host byte order
    pub fn eval_cpu(&self, dtype: Dtype, count: usize) -> Result<Bytes> {
        let nbytes = count.checked_mul(dtype.size()).ok_or_else(|| {
            NpyError::InvalidArray(format!("{} elements of {:?} overflow", count, dtype))
        })?;
        let data = self.reader.read_at(nbytes, self.offset)?;

        if !self.swap_endianness {
            return Ok(data);
        }

        let mut data = BytesMut::from(&data[..]);
        dtype::swap_bytes_in_place(&mut data, dtype.swap_unit());
        Ok(data.freeze())
    }
}

/// Lazily loaded array
#[derive(Debug, Clone)]
pub struct PendingArray {
    dtype: Dtype,
    /// Row-major shape of the bytes on disk
    storage_shape: Vec<usize>,
    /// Payload size, checked against overflow at load time
    nbytes: usize,
    /// Whether the logical array is the transpose of the storage
    transposed: bool,
    node: LoadNode,
}

impl PendingArray {
    pub(crate) fn new(
        dtype: Dtype,
        storage_shape: Vec<usize>,
        nbytes: usize,
        transposed: bool,
        node: LoadNode,
    ) -> Self {
        Self {
            dtype,
            storage_shape,
            nbytes,
            transposed,
            node,
        }
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Logical shape of the array
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = self.storage_shape.clone();
        if self.transposed {
            shape.reverse();
        }
        shape
    }

    pub fn storage_shape(&self) -> &[usize] {
        &self.storage_shape
    }

    pub fn layout(&self) -> Layout {
        if self.transposed {
            Layout::ColumnMajor
        } else {
            Layout::RowMajor
        }
    }

    pub fn element_count(&self) -> usize {
        self.nbytes / self.dtype.size()
    }

    pub fn nbytes(&self) -> usize {
        self.nbytes
    }

    pub fn node(&self) -> &LoadNode {
        &self.node
    }

    /// Evaluate the load node and wrap the bytes with the logical shape.
    ///
    /// A transposed load is column-major over the logical shape; no bytes move.
    pub fn resolve(&self) -> Result<HostArray> {
        let data = self.node.eval_cpu(self.dtype, self.element_count())?;
        HostArray::from_bytes(self.dtype, self.shape(), self.layout(), data)
    }
}
