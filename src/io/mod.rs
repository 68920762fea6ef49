//! IO Module
//!
//! Stream abstractions and the concurrent file reader.
//!
//! ## Responsibilities
//! - `Reader`/`Writer` traits consumed by the save/load paths
//! - In-memory streams (`Vec<u8>`, `MemoryReader`)
//! - File streams with chunked positional reads (`ParallelFileReader`)
//! - The process-wide worker pool shared by all file readers

mod stream;
mod file;
mod pool;

pub use stream::{MemoryReader, Reader, Writer};
pub use file::{FileWriter, ParallelFileReader, MAX_READ_SIZE};
pub use pool::{TaskHandle, WorkerPool};
