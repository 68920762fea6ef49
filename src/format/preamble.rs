//! Preamble framing
//!
//! Magic, version selection, little-endian header length and header text.

use crate::error::{NpyError, Result};
use crate::io::{Reader, Writer};

use super::header::{pad, Header};
use super::{FormatVersion, MAGIC, MAGIC_AND_VERSION_SIZE, V1_HEADER_MARGIN};

/// Everything learned from reading a preamble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub version: FormatVersion,
    pub header: Header,
    /// Length of the padded header text in bytes
    pub header_len: usize,
    /// Offset of the first payload byte from the start of the stream
    pub payload_offset: u64,
    /// Whether payload elements must be byte-swapped for the host
    pub swap_endianness: bool,
}

/// Pick the format version for an unpadded header of `header_text_len` bytes
pub fn choose_version(header_text_len: usize) -> FormatVersion {
    if header_text_len + V1_HEADER_MARGIN < u16::MAX as usize {
        FormatVersion::V1
    } else {
        FormatVersion::V2
    }
}

/// Encode the full preamble for `header` into bytes
pub fn encode_preamble(header: &Header) -> Result<(FormatVersion, Vec<u8>)> {
    let text = header.render();
    let version = choose_version(text.len());
    let text = pad(text, version);

    let mut bytes =
        Vec::with_capacity(MAGIC_AND_VERSION_SIZE + version.length_field_width() + text.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(version.major());
    bytes.push(version.minor());

    let too_large =
        || NpyError::InvalidArray(format!("header of {} bytes is too large", text.len()));
    match version {
        FormatVersion::V1 => {
            let len = u16::try_from(text.len()).map_err(|_| too_large())?;
            bytes.extend_from_slice(&len.to_le_bytes());
        }
        FormatVersion::V2 => {
            let len = u32::try_from(text.len()).map_err(|_| too_large())?;
            bytes.extend_from_slice(&len.to_le_bytes());
        }
    }
    bytes.extend_from_slice(text.as_bytes());

    Ok((version, bytes))
}

/// Write magic, version, header length and padded header text.
///
/// Returns the number of bytes written, which is the payload offset.
pub fn write_preamble<W: Writer + ?Sized>(out: &mut W, header: &Header) -> Result<usize> {
    let (version, bytes) = encode_preamble(header)?;

    tracing::debug!(
        "Writing v{} preamble ({} bytes) to {}",
        version.major(),
        bytes.len(),
        out.label()
    );

    out.write(&bytes)?;
    Ok(bytes.len())
}

/// Read and validate a preamble from the current position of `input`
pub fn read_preamble<R: Reader + ?Sized>(input: &R) -> Result<Preamble> {
    let label = input.label();

    let mut magic_and_version = [0u8; MAGIC_AND_VERSION_SIZE];
    input.read(&mut magic_and_version)?;

    if &magic_and_version[..MAGIC.len()] != MAGIC {
        return Err(NpyError::BadMagic { label });
    }

    let major = magic_and_version[6];
    let version = FormatVersion::from_major(major)
        .ok_or(NpyError::UnsupportedVersion {
            label: label.clone(),
            version: major,
        })?;

    let header_len = match version {
        FormatVersion::V1 => {
            let mut len = [0u8; 2];
            input.read(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        FormatVersion::V2 => {
            let mut len = [0u8; 4];
            input.read(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
    };

    let mut text = vec![0u8; header_len];
    input.read(&mut text)?;
    let text = String::from_utf8(text).map_err(|e| NpyError::HeaderParse {
        label: label.clone(),
        detail: format!("header is not valid text: {}", e),
    })?;

    let header = Header::parse(&text, &label)?;
    let preamble_len = MAGIC_AND_VERSION_SIZE + version.length_field_width() + header_len;
    let payload_offset = preamble_len as u64;
    let swap_endianness = header.needs_swap();

    tracing::debug!(
        "Read v{} preamble from {}: descr={} layout={:?} shape={:?} offset={}",
        version.major(),
        label,
        header.typestring(),
        header.layout,
        header.shape,
        payload_offset
    );

    Ok(Preamble {
        version,
        header,
        header_len,
        payload_offset,
        swap_endianness,
    })
}
