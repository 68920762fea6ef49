//! npyio Inspect Binary
//!
//! Prints the preamble of `.npy` files and optionally verifies the payload.

use std::path::{Path, PathBuf};

use clap::Parser;
use npyio::format::read_preamble;
use npyio::io::{ParallelFileReader, Reader};
use npyio::{Device, ReaderConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// npyio Inspect
#[derive(Parser, Debug)]
#[command(name = "npyio-inspect")]
#[command(about = "Inspect .npy array files")]
#[command(version)]
struct Args {
    /// Files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Read the whole payload through the chunked reader
    #[arg(short, long)]
    verify: bool,

    /// Chunk size in MB for payload reads
    #[arg(short, long, default_value = "32")]
    batch_mb: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,npyio=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    tracing::info!("npyio-inspect v{}", npyio::VERSION);

    let config = ReaderConfig::builder()
        .batch_size(args.batch_mb * 1024 * 1024)
        .build();

    let mut failures = 0;
    for path in &args.files {
        if let Err(e) = inspect(path, &config, args.verify) {
            tracing::error!("{}: {}", path.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

fn inspect(path: &Path, config: &ReaderConfig, verify: bool) -> npyio::Result<()> {
    let reader = ParallelFileReader::open_with_config(path, config.clone());
    if !reader.is_open() {
        return Err(npyio::NpyError::StreamOpen {
            label: reader.label(),
        });
    }

    let preamble = read_preamble(&reader)?;
    let header = &preamble.header;

    println!("{}", path.display());
    println!("  version:        {}.0", preamble.version.major());
    println!("  descr:          {} ({:?})", header.typestring(), header.dtype);
    println!("  layout:         {:?}", header.layout);
    println!("  shape:          {:?}", header.shape);
    if let Some(size) = header.payload_size() {
        println!("  payload size:   {}", size);
    }
    println!("  header length:  {}", preamble.header_len);
    println!("  payload offset: {}", preamble.payload_offset);
    println!("  byte swap:      {}", preamble.swap_endianness);

    if verify {
        let pending = npyio::load_file_with_config(path, config.clone(), Device::Cpu)?;
        let array = pending.resolve()?;
        println!("  payload bytes:  {} (ok)", array.bytes().len());
    }

    Ok(())
}
