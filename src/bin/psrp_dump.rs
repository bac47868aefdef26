//! psrp_dump - Inspeksi frame envelope dari capture file
//!
//! Decode setiap frame sebagai envelope untyped dan log header,
//! target scope, dan payload.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin psrp_dump -- session.cap
//! cargo run --release --bin psrp_dump -- --raw frame.bin --verbose
//! cargo run --release --bin psrp_dump -- --headers-only session.cap
//! ```
//!
//! # Options
//!
//! - `--raw` - File berisi satu frame, bukan capture
//! - `--headers-only` - Decode header saja, payload tidak disentuh
//! - `-v, --verbose` - Trace-level logging (juga via `PSRP_DUMP_VERBOSE`)

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use psrp_wire::core::{map_file, CaptureError, CaptureReader};
use psrp_wire::payload::CborCodec;
use psrp_wire::protocol::{DynamicEnvelope, EnvelopeHeader, TargetScope};
use psrp_wire::EnvelopeError;

/// Dump configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "psrp_dump", about = "Decode and print remoting envelope frames")]
struct DumpConfig {
    /// Capture file (or a single frame with --raw)
    path: PathBuf,

    /// Treat the whole file as one frame instead of a capture
    #[arg(long)]
    raw: bool,

    /// Skip payload decoding, print headers only
    #[arg(long)]
    headers_only: bool,

    /// Trace-level logging for this crate
    #[arg(short, long, env = "PSRP_DUMP_VERBOSE")]
    verbose: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("session.cap"),
            raw: false,
            headers_only: false,
            verbose: false,
        }
    }
}

/// Hitungan hasil dump
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DumpStats {
    frames: u64,
    failed: u64,
    invalid_target: u64,
}

fn dump_frame(index: u64, frame: &[u8], config: &DumpConfig, stats: &mut DumpStats) {
    stats.frames += 1;

    let header = if config.headers_only {
        EnvelopeHeader::peek(frame).map_err(EnvelopeError::from)
    } else {
        DynamicEnvelope::from_bytes(frame, &CborCodec).map(|envelope| {
            let target = envelope.target();
            match envelope.data() {
                Some(payload) => info!(index, ?target, ?payload, "payload"),
                None => info!(index, ?target, "header-only frame"),
            }
            *envelope.header()
        })
    };

    match header {
        Ok(header) => {
            if header.target() == TargetScope::Invalid {
                stats.invalid_target += 1;
                warn!(
                    index,
                    message_type = ?header.message_type(),
                    "no target scope for message type"
                );
            }
            info!(
                index,
                bytes = frame.len(),
                destination = ?header.destination(),
                message_type = ?header.message_type(),
                target = ?header.target(),
                runspace_pool_id = %header.runspace_pool_id(),
                pipeline_id = %header.pipeline_id(),
                "frame"
            );
        }
        Err(e) => {
            stats.failed += 1;
            warn!(index, bytes = frame.len(), error = %e, "failed to decode frame");
        }
    }
}

fn run(config: &DumpConfig) -> Result<DumpStats, CaptureError> {
    let mut stats = DumpStats::default();

    if config.raw {
        let mmap = map_file(&config.path)?;
        dump_frame(0, &mmap, config, &mut stats);
        return Ok(stats);
    }

    let reader = CaptureReader::open(&config.path)?;
    info!(path = %config.path.display(), bytes = reader.len_bytes(), "reading capture");

    for (index, frame) in reader.frames().enumerate() {
        dump_frame(index as u64, frame?, config, &mut stats);
    }

    Ok(stats)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,psrp_wire=trace,psrp_dump=trace"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let config = DumpConfig::parse();
    init_tracing(config.verbose);

    match run(&config) {
        Ok(stats) => {
            info!(
                frames = stats.frames,
                failed = stats.failed,
                invalid_target = stats.invalid_target,
                "done"
            );
        }
        Err(e) => {
            error!(path = %config.path.display(), error = %e, "dump failed");
            std::process::exit(1);
        }
    }
}
