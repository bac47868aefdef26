//! Error taxonomy untuk envelope codec
//!
//! Setiap kegagalan decode fatal untuk satu frame saja. Tidak ada retry
//! atau partial recovery di layer ini; transport yang memutuskan apakah
//! stream di-resync atau ditutup.

use std::io;

use thiserror::Error;

/// A fixed-size field could not be read in full.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("truncated {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("I/O error while reading frame: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by a payload codec.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload encoding error: {0}")]
    Encode(String),

    #[error("payload decoding error: {0}")]
    Decode(String),
}

/// A decoded payload value does not fit the statically expected type.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("cannot convert payload to {target}: {reason}")]
    Mismatch {
        target: &'static str,
        reason: String,
    },
}

impl ConversionError {
    pub fn mismatch<T>(reason: impl Into<String>) -> Self {
        ConversionError::Mismatch {
            target: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }
}

/// Everything that can go wrong encoding or decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error("failed to encode payload: {0}")]
    PayloadEncode(#[source] PayloadError),

    #[error("failed to decode payload: {0}")]
    PayloadDecode(#[source] PayloadError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("I/O error while writing frame: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
