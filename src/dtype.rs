//! Element types and array protocol typestrings
//!
//! ## Typestring Format
//! ```text
//! ┌──────────────┬──────────┬──────────────┐
//! │ Order (0/1)  │ Kind (1) │  Width (1)   │
//! └──────────────┴──────────┴──────────────┘
//! ```
//! - Order: `<` little, `>` big, `|` not applicable (single-byte types)
//! - Kind:  `b` bool, `i` signed, `u` unsigned, `f` float, `c` complex
//! - Width: total size of one element in bytes
//!
//! `V2` is reserved for bfloat16.

use crate::error::{NpyError, Result};

/// Scalar element type of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    BFloat16,
    Complex64,
}

/// Category of an element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtypeKind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Complex,
    /// bfloat16-style narrow float
    NarrowFloat,
}

impl Dtype {
    /// All supported element types
    pub const ALL: [Dtype; 13] = [
        Dtype::Bool,
        Dtype::Int8,
        Dtype::Int16,
        Dtype::Int32,
        Dtype::Int64,
        Dtype::UInt8,
        Dtype::UInt16,
        Dtype::UInt32,
        Dtype::UInt64,
        Dtype::Float16,
        Dtype::Float32,
        Dtype::BFloat16,
        Dtype::Complex64,
    ];

    /// Size of one element in bytes
    pub fn size(self) -> usize {
        match self {
            Dtype::Bool | Dtype::Int8 | Dtype::UInt8 => 1,
            Dtype::Int16 | Dtype::UInt16 | Dtype::Float16 | Dtype::BFloat16 => 2,
            Dtype::Int32 | Dtype::UInt32 | Dtype::Float32 => 4,
            Dtype::Int64 | Dtype::UInt64 | Dtype::Complex64 => 8,
        }
    }

    pub fn kind(self) -> DtypeKind {
        match self {
            Dtype::Bool => DtypeKind::Bool,
            Dtype::Int8 | Dtype::Int16 | Dtype::Int32 | Dtype::Int64 => DtypeKind::SignedInt,
            Dtype::UInt8 | Dtype::UInt16 | Dtype::UInt32 | Dtype::UInt64 => {
                DtypeKind::UnsignedInt
            }
            Dtype::Float16 | Dtype::Float32 => DtypeKind::Float,
            Dtype::BFloat16 => DtypeKind::NarrowFloat,
            Dtype::Complex64 => DtypeKind::Complex,
        }
    }

    /// Width of the unit that must be byte-swapped when converting byte order.
    ///
    /// Complex values swap each component independently.
    pub fn swap_unit(self) -> usize {
        match self {
            Dtype::Complex64 => 4,
            other => other.size(),
        }
    }
}

impl DtypeKind {
    /// Array protocol kind letter
    pub fn letter(self) -> char {
        match self {
            DtypeKind::Bool => 'b',
            DtypeKind::SignedInt => 'i',
            DtypeKind::UnsignedInt => 'u',
            DtypeKind::Float => 'f',
            DtypeKind::Complex => 'c',
            DtypeKind::NarrowFloat => 'V',
        }
    }
}

/// Byte order of multi-byte elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the running host
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    pub fn marker(self) -> char {
        match self {
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
        }
    }
}

/// Encode a dtype as a typestring using the host byte order
pub fn to_typestring(dtype: Dtype) -> String {
    to_typestring_with_order(dtype, ByteOrder::native())
}

/// Encode a dtype as a typestring with an explicit byte order marker.
///
/// Single-byte types always carry `|`.
pub(crate) fn to_typestring_with_order(dtype: Dtype, order: ByteOrder) -> String {
    let marker = if dtype.size() > 1 { order.marker() } else { '|' };
    format!("{}{}{}", marker, dtype.kind().letter(), dtype.size())
}

/// Decode a 2 or 3 character typestring into a dtype.
///
/// The byte order marker, when present, is ignored here; see
/// [`typestring_order`].
pub fn from_typestring(typestring: &str) -> Result<Dtype> {
    let invalid = || NpyError::InvalidTypestring(typestring.to_string());

    let bytes = typestring.as_bytes();
    let code = match bytes.len() {
        2 => bytes,
        3 => &bytes[1..],
        _ => return Err(invalid()),
    };

    if code == b"V2" {
        return Ok(Dtype::BFloat16);
    }

    let width = match code[1] {
        c @ b'0'..=b'9' => c - b'0',
        _ => return Err(invalid()),
    };

    let dtype = match (code[0], width) {
        (b'b', 1) => Dtype::Bool,
        (b'i', 1) => Dtype::Int8,
        (b'i', 2) => Dtype::Int16,
        (b'i', 4) => Dtype::Int32,
        (b'i', 8) => Dtype::Int64,
        (b'u', 1) => Dtype::UInt8,
        (b'u', 2) => Dtype::UInt16,
        (b'u', 4) => Dtype::UInt32,
        (b'u', 8) => Dtype::UInt64,
        (b'f', 2) => Dtype::Float16,
        (b'f', 4) => Dtype::Float32,
        (b'c', 8) => Dtype::Complex64,
        _ => return Err(invalid()),
    };

    Ok(dtype)
}

/// Byte order declared by a typestring's marker, if any.
///
/// `|` and marker-less typestrings declare no order.
pub fn typestring_order(typestring: &str) -> Option<ByteOrder> {
    match typestring.as_bytes().first() {
        Some(b'<') if typestring.len() == 3 => Some(ByteOrder::Little),
        Some(b'>') if typestring.len() == 3 => Some(ByteOrder::Big),
        _ => None,
    }
}

/// Reverse the bytes of every `unit`-sized element in place
pub fn swap_bytes_in_place(data: &mut [u8], unit: usize) {
    if unit <= 1 {
        return;
    }
    for element in data.chunks_exact_mut(unit) {
        element.reverse();
    }
}
