//! Header text
//!
//! Renders and parses the textual metadata block:
//! ```text
//! {'descr': '<f4', 'fortran_order': False, 'shape': (2, 3, )}
//! ```
//! Parsing is positional and only guaranteed for headers produced by
//! [`Header::render`]: the typestring starts at column 11, the layout flag at
//! column 34, and the shape sits between the last `(` and the last `)`.

use std::fmt::Write as _;

use crate::array::{self, Layout};
use crate::dtype::{self, ByteOrder, Dtype};
use crate::error::{NpyError, Result};

use super::{FormatVersion, MAGIC_AND_VERSION_SIZE, PREAMBLE_ALIGNMENT};

/// Column where the typestring starts
const DESCR_COLUMN: usize = 11;

/// Column holding the first character of `True`/`False`
const FORTRAN_COLUMN: usize = 34;

/// Parsed or to-be-rendered header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub dtype: Dtype,
    /// Byte order of the payload. Irrelevant for single-byte types.
    pub byte_order: ByteOrder,
    pub layout: Layout,
    /// Dimensions in file order
    pub shape: Vec<usize>,
}

impl Header {
    /// Header for data in the host byte order
    pub fn new(dtype: Dtype, layout: Layout, shape: Vec<usize>) -> Self {
        Self {
            dtype,
            byte_order: ByteOrder::native(),
            layout,
            shape,
        }
    }

    /// Typestring for this header's dtype and byte order
    pub fn typestring(&self) -> String {
        dtype::to_typestring_with_order(self.dtype, self.byte_order)
    }

    /// Render the unpadded header text
    pub fn render(&self) -> String {
        let fortran_order = match self.layout {
            Layout::ColumnMajor => "True",
            Layout::RowMajor => "False",
        };

        let mut text = format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': (",
            self.typestring(),
            fortran_order
        );
        for dim in &self.shape {
            // Writing into a String cannot fail
            let _ = write!(text, "{}, ", dim);
        }
        text.push_str(")}");
        text
    }

    /// Whether the payload must be byte-swapped to match the host
    pub fn needs_swap(&self) -> bool {
        self.dtype.size() > 1 && self.byte_order != ByteOrder::native()
    }

    /// Payload size in bytes, or `None` if the shape overflows
    pub fn payload_size(&self) -> Option<usize> {
        array::payload_size(&self.shape, self.dtype)
    }

    /// Parse header text produced by [`Header::render`].
    ///
    /// `label` names the source stream in error messages.
    pub fn parse(text: &str, label: &str) -> Result<Self> {
        let parse_error = |detail: String| NpyError::HeaderParse {
            label: label.to_string(),
            detail,
        };

        let descr = text
            .get(DESCR_COLUMN..DESCR_COLUMN + 3)
            .ok_or_else(|| parse_error("header too short for typestring".to_string()))?;
        // Two-character typestrings are followed by the closing quote
        let descr = descr.strip_suffix('\'').unwrap_or(descr);

        let dtype = dtype::from_typestring(descr)?;
        let byte_order = dtype::typestring_order(descr).unwrap_or(ByteOrder::native());

        let layout = match text.as_bytes().get(FORTRAN_COLUMN) {
            Some(b'T') => Layout::ColumnMajor,
            Some(_) => Layout::RowMajor,
            None => return Err(parse_error("header too short for fortran_order".to_string())),
        };

        let start = text
            .rfind('(')
            .ok_or_else(|| parse_error("missing '(' in shape".to_string()))?;
        let end = text
            .rfind(')')
            .filter(|&end| end > start)
            .ok_or_else(|| parse_error("missing ')' in shape".to_string()))?;

        let shape = parse_shape(&text[start + 1..end]).map_err(parse_error)?;

        let header = Self {
            dtype,
            byte_order,
            layout,
            shape,
        };
        if header.payload_size().is_none() {
            return Err(parse_error(format!(
                "shape {:?} of {:?} overflows",
                header.shape, header.dtype
            )));
        }

        Ok(header)
    }
}

/// Pad rendered header text with spaces and a final newline so that the whole
/// preamble for `version` is a multiple of 16 bytes.
pub fn pad(mut text: String, version: FormatVersion) -> String {
    let unpadded = MAGIC_AND_VERSION_SIZE + version.length_field_width() + text.len() + 1;
    let padding = (PREAMBLE_ALIGNMENT - unpadded % PREAMBLE_ALIGNMENT) % PREAMBLE_ALIGNMENT;

    text.extend(std::iter::repeat(' ').take(padding));
    text.push('\n');
    text
}

/// Tokenize `d0, d1, ..., ` into dimensions.
///
/// Tokens are separated by `", "`; the last token may be followed by nothing,
/// a single space, or a single comma.
fn parse_shape(tuple: &str) -> std::result::Result<Vec<usize>, String> {
    let mut shape = Vec::new();
    let mut rest = tuple;

    while !rest.is_empty() {
        let token = rest.trim_start();
        let digits = token.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(format!("malformed dimension in shape ({})", tuple));
        }

        let dim = token[..digits]
            .parse::<usize>()
            .map_err(|e| format!("invalid dimension {:?}: {}", &token[..digits], e))?;
        shape.push(dim);

        rest = &token[digits..];
        if rest.len() >= 2 {
            rest = rest
                .strip_prefix(", ")
                .ok_or_else(|| format!("unexpected separator in shape ({})", tuple))?;
        } else {
            if !rest.is_empty() && rest != " " && rest != "," {
                return Err(format!("unexpected trailing content in shape ({})", tuple));
            }
            rest = "";
        }
    }

    Ok(shape)
}
