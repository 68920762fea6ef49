//! Error types for npyio
//!
//! Provides a unified error type for all save/load operations.

use thiserror::Error;

use crate::load::Device;

/// Result type alias using NpyError
pub type Result<T> = std::result::Result<T, NpyError>;

/// Unified error type for npyio operations
#[derive(Debug, Error)]
pub enum NpyError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open {label}")]
    StreamOpen { label: String },

    #[error("Unable to read {requested} bytes from stream")]
    ShortRead { requested: usize },

    #[error("Read error: {0}")]
    Read(String),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Invalid header in {label}")]
    BadMagic { label: String },

    #[error("Unsupported npy format version {version} in {label}")]
    UnsupportedVersion { label: String, version: u8 },

    #[error("Invalid array protocol typestring: {0:?}")]
    InvalidTypestring(String),

    #[error("Error while parsing header in {label}: {detail}")]
    HeaderParse { label: String, detail: String },

    // -------------------------------------------------------------------------
    // Precondition Errors
    // -------------------------------------------------------------------------
    #[error("Cannot serialize an empty array")]
    EmptyArray,

    #[error("Load must run on a CPU device, got {0:?}")]
    DeviceUnsupported(Device),

    #[error("Invalid array: {0}")]
    InvalidArray(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Worker pool error: {0}")]
    Pool(String),
}
