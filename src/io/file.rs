//! File streams
//!
//! `FileWriter` for saving and `ParallelFileReader` for loading.
//!
//! ## Positional Reads
//! ```text
//! offset                                              offset + n
//!   │◄── batch ──►│◄── batch ──►│◄── batch ──►│◄─ tail ─►│
//!   │  worker A   │  worker B   │  worker C   │  inline  │
//! ```
//! Full chunks go to the shared worker pool; the tail is read on the calling
//! thread. Every chunk uses an offset-explicit read, so workers never touch
//! the shared file cursor. The call fails if any chunk fails, but only after
//! all dispatched chunks have finished.
//!
//! Sequential reads keep their own cursor and also read by offset. On Windows
//! `seek_read` moves the OS cursor, so it cannot be trusted between calls.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::config::ReaderConfig;
use crate::error::{NpyError, Result};

use super::pool::WorkerPool;
use super::stream::{Reader, Writer};

/// Upper bound for a single read call
pub const MAX_READ_SIZE: usize = i32::MAX as usize;

// =============================================================================
// FileWriter
// =============================================================================

/// Buffered file sink
///
/// Open failures are recorded rather than returned; `is_open` reports them.
pub struct FileWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileWriter {
    /// Create or truncate the file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let writer = match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
        {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                tracing::warn!("Failed to open {} for writing: {}", path.display(), e);
                None
            }
        };

        Self { path, writer }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn inner(&mut self) -> Result<&mut BufWriter<File>> {
        let label = self.label();
        self.writer.as_mut().ok_or(NpyError::StreamOpen { label })
    }
}

impl Writer for FileWriter {
    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn label(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner()?.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner()?.flush()?;
        Ok(())
    }
}

// =============================================================================
// ParallelFileReader
// =============================================================================

/// File source that splits large positional reads across the worker pool
pub struct ParallelFileReader {
    path: PathBuf,
    file: Option<Arc<File>>,
    /// Offset of the next sequential read
    position: Mutex<u64>,
    config: ReaderConfig,
    pool: &'static WorkerPool,
}

impl ParallelFileReader {
    /// Open `path` with the default config and the global worker pool
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_config(path, ReaderConfig::default())
    }

    pub fn open_with_config(path: impl Into<PathBuf>, config: ReaderConfig) -> Self {
        let path = path.into();
        let file = match File::open(&path) {
            Ok(file) => Some(Arc::new(file)),
            Err(e) => {
                tracing::warn!("Failed to open {} for reading: {}", path.display(), e);
                None
            }
        };

        Self {
            path,
            file,
            position: Mutex::new(0),
            config,
            pool: WorkerPool::global(),
        }
    }

    /// Dispatch chunks to `pool` instead of the global pool
    pub fn with_pool(mut self, pool: &'static WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset the next sequential read starts from
    pub fn position(&self) -> u64 {
        *self.position.lock()
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    fn file(&self) -> Result<&Arc<File>> {
        self.file.as_ref().ok_or_else(|| NpyError::StreamOpen {
            label: self.label(),
        })
    }

    /// Fill `buf` from the current position and advance past the bytes read
    pub fn sequential_read(&self, buf: &mut [u8]) -> Result<()> {
        let file = self.file()?;
        let mut position = self.position.lock();

        let filled = fill_at(file, buf, *position);
        *position += filled as u64;

        if filled < buf.len() {
            tracing::warn!(
                "Short read from {}: {} of {} bytes",
                self.path.display(),
                filled,
                buf.len()
            );
            return Err(NpyError::ShortRead {
                requested: buf.len() - filled,
            });
        }

        Ok(())
    }

    /// Read `n` bytes at `offset`, splitting the range into batch-sized chunks
    pub fn positional_read(&self, n: usize, offset: u64) -> Result<Bytes> {
        let file = self.file()?;
        let batch_size = self.batch_size();

        let mut remaining = BytesMut::zeroed(n);
        let mut chunk_offset = offset;
        let mut pending = Vec::with_capacity(n / batch_size);

        while remaining.len() >= batch_size {
            let mut chunk = remaining.split_to(batch_size);
            let file = Arc::clone(file);
            let at = chunk_offset;

            tracing::trace!("Dispatching chunk of {} bytes at offset {}", batch_size, at);
            pending.push(self.pool.submit(move || {
                let ok = read_chunk(&file, &mut chunk, at);
                (ok, chunk)
            }));

            chunk_offset += batch_size as u64;
        }

        // Tail smaller than one batch
        let tail_ok = remaining.is_empty() || read_chunk(file, &mut remaining, chunk_offset);

        let mut assembled = BytesMut::new();
        let mut failed = false;
        for (index, handle) in pending.into_iter().enumerate() {
            match handle.join() {
                Ok((true, chunk)) => assembled.unsplit(chunk),
                Ok((false, _)) => {
                    tracing::warn!("Chunk {} of {} failed", index, self.path.display());
                    failed = true;
                }
                Err(e) => {
                    tracing::warn!("Chunk {} of {} lost: {}", index, self.path.display(), e);
                    failed = true;
                }
            }
        }

        if !tail_ok {
            let path = self.path.display();
            tracing::warn!("Tail read at offset {} of {} failed", chunk_offset, path);
        }

        if failed || !tail_ok {
            return Err(NpyError::Read(format!(
                "Unable to read {} bytes at offset {} from {}",
                n,
                offset,
                self.label()
            )));
        }

        assembled.unsplit(remaining);
        Ok(assembled.freeze())
    }
}

impl Reader for ParallelFileReader {
    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn label(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn read(&self, buf: &mut [u8]) -> Result<()> {
        self.sequential_read(buf)
    }

    fn read_at(&self, n: usize, offset: u64) -> Result<Bytes> {
        self.positional_read(n, offset)
    }
}

/// Fill `buf` from `offset` with bounded positional reads
fn read_chunk(file: &File, buf: &mut [u8], offset: u64) -> bool {
    fill_at(file, buf, offset) == buf.len()
}

/// Read into `buf` from `offset` until it is full, the file ends, or a read
/// fails. Returns the number of bytes filled.
fn fill_at(file: &File, buf: &mut [u8], offset: u64) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        let end = filled + (buf.len() - filled).min(MAX_READ_SIZE);
        match pread(file, &mut buf[filled..end], offset + filled as u64) {
            Ok(0) => break,
            Ok(m) => filled += m,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("Read at offset {} failed: {}", offset + filled as u64, e);
                break;
            }
        }
    }
    filled
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}
