//! Core module: capture file dengan mmap backing
//!
//! Prinsip desain:
//! - Zero-Copy: frame dibaca langsung dari region mmap
//! - Append-only: writer hanya menambah record di akhir file

mod capture;

pub use capture::{map_file, CaptureError, CaptureReader, CaptureWriter, Frames, CAPTURE_MAGIC};
