//! Array values
//!
//! [`ArrayValue`] is what the save path needs from an array. [`HostArray`] is
//! a plain contiguous host buffer implementing it, and is what a resolved load
//! produces.

use bytes::Bytes;

use crate::dtype::Dtype;
use crate::error::{NpyError, Result};

/// Memory order of a contiguous array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// C order: last axis varies fastest
    #[default]
    RowMajor,
    /// Fortran order: first axis varies fastest
    ColumnMajor,
}

/// Array interface consumed by `save`
pub trait ArrayValue {
    /// A contiguous version of this array.
    ///
    /// Column-major storage is acceptable only when `allow_col_major` is set.
    fn contiguous(&self, allow_col_major: bool) -> Result<Self>
    where
        Self: Sized;

    /// Force materialization of the backing bytes
    fn eval(&mut self) -> Result<()>;

    fn dtype(&self) -> Dtype;

    fn shape(&self) -> &[usize];

    fn layout(&self) -> Layout;

    /// Contiguous backing bytes in the array's memory order
    fn data(&self) -> &[u8];

    fn nbytes(&self) -> usize {
        self.data().len()
    }
}

/// Contiguous array in host memory
#[derive(Debug, Clone, PartialEq)]
pub struct HostArray {
    dtype: Dtype,
    shape: Vec<usize>,
    layout: Layout,
    data: Bytes,
}

impl HostArray {
    /// Wrap raw bytes laid out in `layout` order
    pub fn from_bytes(
        dtype: Dtype,
        shape: Vec<usize>,
        layout: Layout,
        data: impl Into<Bytes>,
    ) -> Result<Self> {
        let data = data.into();
        let expected = payload_size(&shape, dtype).ok_or_else(|| {
            NpyError::InvalidArray(format!("shape {:?} of {:?} overflows", shape, dtype))
        })?;
        if data.len() != expected {
            return Err(NpyError::InvalidArray(format!(
                "shape {:?} of {:?} needs {} bytes, got {}",
                shape,
                dtype,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            dtype,
            shape,
            layout,
            data,
        })
    }

    /// Row-major array from typed values
    pub fn from_slice<T: Element>(values: &[T], shape: Vec<usize>) -> Result<Self> {
        let mut data = Vec::with_capacity(values.len() * T::DTYPE.size());
        for value in values {
            value.write_ne(&mut data);
        }
        Self::from_bytes(T::DTYPE, shape, Layout::RowMajor, data)
    }

    /// Elements in storage order
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(NpyError::InvalidArray(format!(
                "cannot view {:?} array as {:?}",
                self.dtype,
                T::DTYPE
            )));
        }
        Ok(self
            .data
            .chunks_exact(self.dtype.size())
            .map(T::read_ne)
            .collect())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Copy with row-major storage
    pub fn to_row_major(&self) -> HostArray {
        self.with_layout(Layout::RowMajor)
    }

    /// Copy with column-major storage
    pub fn to_column_major(&self) -> HostArray {
        self.with_layout(Layout::ColumnMajor)
    }

    fn with_layout(&self, layout: Layout) -> HostArray {
        if layout == self.layout {
            return self.clone();
        }
        let data = relayout(&self.data, &self.shape, self.dtype.size(), self.layout, layout);
        HostArray {
            dtype: self.dtype,
            shape: self.shape.clone(),
            layout,
            data: Bytes::from(data),
        }
    }
}

impl ArrayValue for HostArray {
    fn contiguous(&self, allow_col_major: bool) -> Result<Self> {
        match self.layout {
            Layout::ColumnMajor if !allow_col_major => Ok(self.to_row_major()),
            _ => Ok(self.clone()),
        }
    }

    fn eval(&mut self) -> Result<()> {
        Ok(())
    }

    fn dtype(&self) -> Dtype {
        self.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Number of elements in `shape`, or `None` if it overflows
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |count, &dim| count.checked_mul(dim))
}

/// Byte size of a `shape` array of `dtype`, or `None` if it overflows
pub fn payload_size(shape: &[usize], dtype: Dtype) -> Option<usize> {
    element_count(shape)?.checked_mul(dtype.size())
}

/// Element strides (in elements) for `shape` stored in `layout` order
fn strides(shape: &[usize], layout: Layout) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    match layout {
        Layout::RowMajor => {
            for axis in (0..shape.len().saturating_sub(1)).rev() {
                strides[axis] = strides[axis + 1] * shape[axis + 1];
            }
        }
        Layout::ColumnMajor => {
            for axis in 1..shape.len() {
                strides[axis] = strides[axis - 1] * shape[axis - 1];
            }
        }
    }
    strides
}

/// Reorder elements of `data` from one memory order to another
fn relayout(data: &[u8], shape: &[usize], elem: usize, from: Layout, to: Layout) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    let count: usize = shape.iter().product();
    if count == 0 {
        return out;
    }

    let src_strides = strides(shape, from);
    let dst_strides = strides(shape, to);
    let mut index = vec![0usize; shape.len()];

    for _ in 0..count {
        let offset = |strides: &[usize]| -> usize {
            index.iter().zip(strides).map(|(i, s)| i * s).sum::<usize>() * elem
        };
        let src = offset(&src_strides);
        let dst = offset(&dst_strides);
        out[dst..dst + elem].copy_from_slice(&data[src..src + elem]);

        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }

    out
}

// =============================================================================
// Typed elements
// =============================================================================

/// Rust scalar with a fixed on-disk dtype
pub trait Element: Copy {
    const DTYPE: Dtype;

    /// Append native-endian bytes
    fn write_ne(&self, out: &mut Vec<u8>);

    /// Read from exactly `DTYPE.size()` native-endian bytes
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $d:path) => {
        impl Element for $t {
            const DTYPE: Dtype = $d;

            fn write_ne(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn read_ne(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_ne_bytes(raw)
            }
        }
    };
}

impl_element!(i8, Dtype::Int8);
impl_element!(i16, Dtype::Int16);
impl_element!(i32, Dtype::Int32);
impl_element!(i64, Dtype::Int64);
impl_element!(u8, Dtype::UInt8);
impl_element!(u16, Dtype::UInt16);
impl_element!(u32, Dtype::UInt32);
impl_element!(u64, Dtype::UInt64);
impl_element!(f32, Dtype::Float32);

impl Element for bool {
    const DTYPE: Dtype = Dtype::Bool;

    fn write_ne(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
