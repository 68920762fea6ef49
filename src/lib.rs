//! # npyio
//!
//! Codec for the NumPy `.npy` array format with:
//! - Byte-exact preamble framing (magic, version 1/2, little-endian length)
//! - Positional header parsing for headers produced by this writer
//! - Deferred loading: the payload stays on disk until evaluated
//! - Concurrent chunked positional reads through a shared worker pool
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    save / load (npy)                         │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                ▼                               ▼
//!   ┌────────────────────────┐        ┌─────────────────────────┐
//!   │        Format          │        │       PendingArray      │
//!   │ preamble → header →    │        │  LoadNode (reader,      │
//!   │ dtype                  │        │  offset, swap)          │
//!   └────────────────────────┘        └────────────┬────────────┘
//!                                                  │
//!                                                  ▼
//!                                     ┌─────────────────────────┐
//!                                     │   ParallelFileReader    │
//!                                     │   (chunks → WorkerPool) │
//!                                     └─────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod dtype;
pub mod format;
pub mod io;
pub mod array;
pub mod load;
pub mod npy;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NpyError, Result};
pub use config::ReaderConfig;
pub use dtype::{ByteOrder, Dtype};
pub use array::{ArrayValue, HostArray, Layout};
pub use load::{Device, LoadNode, PendingArray};
pub use npy::{load, load_file, load_file_with_config, save, save_file};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of npyio
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
