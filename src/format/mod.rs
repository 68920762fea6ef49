//! Format Module
//!
//! Byte-exact framing of the `.npy` array format.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Preamble                                             │
//! │ ┌───────────┬────────┬────────┬───────────────────┐  │
//! │ │ Magic (6) │Major(1)│Minor(1)│ Header Len (2|4)  │  │
//! │ └───────────┴────────┴────────┴───────────────────┘  │
//! │ ┌──────────────────────────────────────────────────┐ │
//! │ │ Header text (space padded, '\n' terminated)      │ │
//! │ └──────────────────────────────────────────────────┘ │
//! ├──────────────────────────────────────────────────────┤
//! │ Payload (raw elements, writer's byte order)          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! - Header length is little-endian on disk
//! - Total preamble length is a multiple of 16 bytes
//! - Version 1 uses a 2-byte length field, version 2 a 4-byte one

mod header;
mod preamble;

pub use header::{pad, Header};
pub use preamble::{choose_version, encode_preamble, read_preamble, write_preamble, Preamble};

/// Magic constant at offset 0 of every file
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Magic (6) + major (1) + minor (1)
pub const MAGIC_AND_VERSION_SIZE: usize = 8;

/// Preamble alignment in bytes
pub const PREAMBLE_ALIGNMENT: usize = 16;

/// Framing overhead reserved when deciding whether a header fits version 1
pub const V1_HEADER_MARGIN: usize = 15;

/// On-disk format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// 16-bit header length field
    V1,
    /// 32-bit header length field
    V2,
}

impl FormatVersion {
    pub fn major(self) -> u8 {
        match self {
            FormatVersion::V1 => 1,
            FormatVersion::V2 => 2,
        }
    }

    /// Minor version is always zero
    pub fn minor(self) -> u8 {
        0
    }

    /// Width of the header length field in bytes
    pub fn length_field_width(self) -> usize {
        match self {
            FormatVersion::V1 => 2,
            FormatVersion::V2 => 4,
        }
    }

    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            1 => Some(FormatVersion::V1),
            2 => Some(FormatVersion::V2),
            _ => None,
        }
    }
}
