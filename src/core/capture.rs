//! Capture file: rekaman frame untuk inspeksi offline
//!
//! Frame envelope tidak membawa panjang; batas frame milik transport.
//! Capture menyimpan batas itu sendiri:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Magic "PSRPCAP1" (8 bytes)   │
//! ├──────────────────────────────┤
//! │ u32 LE length │ frame bytes  │  × N
//! └──────────────────────────────┘
//! ```
//!
//! Reader memakai mmap read-only: frame dibaca langsung dari page cache
//! sebagai slice, tanpa copy.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::EnvelopeError;
use crate::payload::PayloadCodec;
use crate::protocol::{decode_u32, encode_u32, Envelope, U32_SIZE};

pub const CAPTURE_MAGIC: [u8; 8] = *b"PSRPCAP1";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a capture file (bad magic)")]
    BadMagic,

    #[error("file is empty")]
    EmptyFile,

    #[error("truncated record at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("frame too large for capture: {0} bytes")]
    FrameTooLarge(usize),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Append-only writer untuk capture file.
pub struct CaptureWriter {
    out: BufWriter<File>,
    frames: u64,
}

impl CaptureWriter {
    /// Membuat capture baru (file lama di-truncate).
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut out = BufWriter::new(file);
        out.write_all(&CAPTURE_MAGIC)?;

        Ok(Self { out, frames: 0 })
    }

    /// Tulis satu frame mentah.
    pub fn append(&mut self, frame: &[u8]) -> Result<(), CaptureError> {
        let len =
            u32::try_from(frame.len()).map_err(|_| CaptureError::FrameTooLarge(frame.len()))?;
        self.out.write_all(&encode_u32(len))?;
        self.out.write_all(frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Encode envelope lalu tulis sebagai satu frame.
    pub fn append_envelope<T, C>(
        &mut self,
        envelope: &Envelope<T>,
        codec: &C,
    ) -> Result<(), CaptureError>
    where
        T: Serialize,
        C: PayloadCodec,
    {
        let frame = envelope.to_bytes(codec)?;
        self.append(&frame)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Flush ke disk. Dipanggil sebelum file dibaca ulang.
    pub fn finish(mut self) -> Result<u64, CaptureError> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(self.frames)
    }
}

/// Read-only view atas capture file (mmap).
pub struct CaptureReader {
    mmap: Mmap,
}

impl CaptureReader {
    /// Open dan validasi magic.
    ///
    /// Precondition sama dengan [`map_file`]: jangan buat `CaptureWriter`
    /// pada path yang sama selama reader ini hidup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let mmap = map_file(path.as_ref())?;
        if mmap.len() < CAPTURE_MAGIC.len() || mmap[..CAPTURE_MAGIC.len()] != CAPTURE_MAGIC {
            return Err(CaptureError::BadMagic);
        }
        debug!(path = %path.as_ref().display(), bytes = mmap.len(), "opened capture");
        Ok(Self { mmap })
    }

    /// Iterasi frame sebagai slice ke region mmap (zero-copy).
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            data: &self.mmap,
            pos: CAPTURE_MAGIC.len(),
        }
    }

    pub fn len_bytes(&self) -> usize {
        self.mmap.len()
    }
}

/// Map seluruh file read-only. File kosong tidak di-map.
///
/// Caller harus menjamin file tidak di-truncate atau ditulis ulang
/// (misalnya oleh `CaptureWriter::create` pada path yang sama) selama
/// map masih hidup.
pub fn map_file(path: &Path) -> Result<Mmap, CaptureError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(CaptureError::EmptyFile);
    }
    // SAFETY: map hanya dibaca. Caller menjamin file tidak di-truncate atau
    // ditulis (termasuk oleh CaptureWriter di proses ini) selama map hidup.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// Iterator frame di capture. Berhenti setelah error pertama.
pub struct Frames<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<&'a [u8], CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let offset = self.pos;
        let rest = &self.data[offset..];

        if rest.len() < U32_SIZE {
            self.pos = self.data.len();
            return Some(Err(CaptureError::TruncatedRecord {
                offset,
                needed: U32_SIZE,
                available: rest.len(),
            }));
        }

        let len = match decode_u32(&rest[..U32_SIZE]) {
            Ok(len) => len as usize,
            Err(e) => {
                self.pos = self.data.len();
                return Some(Err(CaptureError::Envelope(e.into())));
            }
        };

        let body = &rest[U32_SIZE..];
        if body.len() < len {
            self.pos = self.data.len();
            return Some(Err(CaptureError::TruncatedRecord {
                offset,
                needed: U32_SIZE + len,
                available: rest.len(),
            }));
        }

        self.pos = offset + U32_SIZE + len;
        Some(Ok(&body[..len]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_capture_roundtrip_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.cap");

        let mut writer = CaptureWriter::create(&path).unwrap();
        writer.append(b"first frame").unwrap();
        writer.append(b"").unwrap();
        writer.append(&[0xAB; 64]).unwrap();
        assert_eq!(writer.finish().unwrap(), 3);

        let reader = CaptureReader::open(&path).unwrap();
        let frames: Vec<_> = reader.frames().map(|f| f.unwrap().to_vec()).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], b"first frame");
        assert!(frames[1].is_empty());
        assert_eq!(frames[2], vec![0xAB; 64]);
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.cap");
        fs::write(&path, b"NOTACAPTUREFILE").unwrap();

        assert!(matches!(
            CaptureReader::open(&path),
            Err(CaptureError::BadMagic)
        ));
    }

    #[test]
    fn test_truncated_record_stops_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.cap");

        let mut bytes = CAPTURE_MAGIC.to_vec();
        bytes.extend_from_slice(&encode_u32(3));
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(&encode_u32(10));
        bytes.extend_from_slice(b"xy");
        fs::write(&path, &bytes).unwrap();

        let reader = CaptureReader::open(&path).unwrap();
        let mut frames = reader.frames();
        assert_eq!(frames.next().unwrap().unwrap(), b"abc");
        match frames.next().unwrap() {
            Err(CaptureError::TruncatedRecord {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 15);
                assert_eq!(needed, 14);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_recreate_after_reader_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reuse.cap");

        let mut writer = CaptureWriter::create(&path).unwrap();
        writer.append(b"old one").unwrap();
        writer.append(b"old two").unwrap();
        writer.finish().unwrap();

        {
            let reader = CaptureReader::open(&path).unwrap();
            assert_eq!(reader.frames().count(), 2);
        }

        // map sudah di-drop, aman truncate path yang sama
        let mut writer = CaptureWriter::create(&path).unwrap();
        writer.append(b"new").unwrap();
        writer.finish().unwrap();

        let reader = CaptureReader::open(&path).unwrap();
        let frames: Vec<_> = reader.frames().map(|f| f.unwrap().to_vec()).collect();
        assert_eq!(frames, vec![b"new".to_vec()]);
        assert_eq!(reader.len_bytes(), CAPTURE_MAGIC.len() + U32_SIZE + 3);
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.cap");
        fs::write(&path, b"").unwrap();

        assert!(matches!(
            CaptureReader::open(&path),
            Err(CaptureError::EmptyFile)
        ));
    }
}
