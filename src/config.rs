//! Configuration for npyio readers
//!
//! Centralized configuration with sensible defaults.

/// Default chunk size for positional reads (32 MiB)
pub const DEFAULT_BATCH_SIZE: usize = 1 << 25;

/// Number of executor threads in the process-wide worker pool
pub const DEFAULT_POOL_WORKERS: usize = 4;

/// Configuration for a `ParallelFileReader`
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Size in bytes of each chunk dispatched to the worker pool.
    /// A trailing remainder smaller than this is read inline.
    pub batch_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ReaderConfig {
    /// Create a new config builder
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }
}

/// Builder for ReaderConfig
#[derive(Default)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    /// Set the chunk size (in bytes); zero is clamped to one
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size.max(1);
        self
    }

    pub fn build(self) -> ReaderConfig {
        self.config
    }
}
