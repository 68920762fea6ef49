//! Save and load entry points
//!
//! ## Save
//! contiguous → eval → reject empty → preamble → raw bytes
//!
//! ## Load
//! check stream and device → preamble → deferred [`PendingArray`]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::array::{ArrayValue, Layout};
use crate::config::ReaderConfig;
use crate::error::{NpyError, Result};
use crate::format::{read_preamble, write_preamble, Header};
use crate::io::{FileWriter, ParallelFileReader, Reader, Writer};
use crate::load::{Device, LoadNode, PendingArray};

/// File extension appended by [`save_file`]
pub const NPY_EXTENSION: &str = ".npy";

/// Serialize `array` to `out`
pub fn save<W, A>(out: &mut W, array: &A) -> Result<()>
where
    W: Writer + ?Sized,
    A: ArrayValue,
{
    let mut array = array.contiguous(true)?;
    array.eval()?;

    if array.nbytes() == 0 {
        return Err(NpyError::EmptyArray);
    }

    if !out.is_open() {
        return Err(NpyError::StreamOpen { label: out.label() });
    }

    let header = Header::new(array.dtype(), array.layout(), array.shape().to_vec());
    write_preamble(out, &header)?;
    out.write(array.data())?;
    out.flush()?;

    tracing::debug!(
        "Saved {:?} array {:?} ({} bytes) to {}",
        array.dtype(),
        array.shape(),
        array.nbytes(),
        out.label()
    );

    Ok(())
}

/// Serialize `array` to a file, appending `.npy` to the path if missing.
///
/// Returns the path actually written.
pub fn save_file<A: ArrayValue>(path: impl AsRef<Path>, array: &A) -> Result<PathBuf> {
    let path = npy_path(path.as_ref());
    let mut writer = FileWriter::open(&path);
    save(&mut writer, array)?;
    Ok(path)
}

/// Parse the preamble from `reader` and build a deferred array.
///
/// Only [`Device::Cpu`] is accepted.
pub fn load(reader: Arc<dyn Reader>, device: Device) -> Result<PendingArray> {
    if !reader.is_open() {
        return Err(NpyError::StreamOpen {
            label: reader.label(),
        });
    }

    if device != Device::Cpu {
        return Err(NpyError::DeviceUnsupported(device));
    }

    let preamble = read_preamble(reader.as_ref())?;
    let header = preamble.header;
    let nbytes = header.payload_size().ok_or_else(|| NpyError::HeaderParse {
        label: reader.label(),
        detail: format!("shape {:?} of {:?} overflows", header.shape, header.dtype),
    })?;

    let transposed = header.layout == Layout::ColumnMajor;
    let mut storage_shape = header.shape;
    if transposed {
        storage_shape.reverse();
    }

    let node = LoadNode {
        device,
        reader,
        offset: preamble.payload_offset,
        swap_endianness: preamble.swap_endianness,
    };

    Ok(PendingArray::new(header.dtype, storage_shape, nbytes, transposed, node))
}

/// Load from a file using the default reader config
pub fn load_file(path: impl Into<PathBuf>, device: Device) -> Result<PendingArray> {
    load_file_with_config(path, ReaderConfig::default(), device)
}

pub fn load_file_with_config(
    path: impl Into<PathBuf>,
    config: ReaderConfig,
    device: Device,
) -> Result<PendingArray> {
    let reader = ParallelFileReader::open_with_config(path, config);
    load(Arc::new(reader), device)
}

fn npy_path(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(NPY_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(NPY_EXTENSION);
    PathBuf::from(name)
}
