//! Payload Bridge: kontrak ke object codec eksternal
//!
//! Envelope tidak tahu format payload. Ia hanya:
//! - menyerahkan value ber-tipe ke `encode` setelah header ditulis
//! - meminta value untyped dari `decode` jika masih ada byte setelah header
//! - mengonversi value itu ke tipe statis lewat `convert` (fallible)
//!
//! Fragmentasi payload besar adalah urusan internal codec/transport.

mod cbor;
mod init_info;

pub use cbor::CborCodec;
pub use init_info::{InitInfoError, PoolInitInfo};

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConversionError, PayloadError};

/// Object codec yang dipakai envelope untuk bagian payload frame.
///
/// Kontraknya: untuk setiap tipe payload `T` yang didukung,
/// `convert::<T>(decode(encode(v)))` menghasilkan value yang sama dengan `v`.
pub trait PayloadCodec {
    /// Representasi untyped hasil decode.
    type Value;

    /// Serialize `value` menjadi byte self-describing, ditulis ke `sink`.
    fn encode<T, W>(&self, value: &T, sink: &mut W) -> Result<(), PayloadError>
    where
        T: Serialize + ?Sized,
        W: Write;

    /// Deserialize satu payload lengkap dari `source`.
    ///
    /// `source` sudah berisi payload yang ter-reassemble penuh.
    fn decode<R: Read>(&self, source: &mut R) -> Result<Self::Value, PayloadError>;

    /// Coerce value untyped ke tipe statis `T`.
    fn convert<T: DeserializeOwned>(&self, value: Self::Value) -> Result<T, ConversionError>;
}

impl<C: PayloadCodec + ?Sized> PayloadCodec for &C {
    type Value = C::Value;

    fn encode<T, W>(&self, value: &T, sink: &mut W) -> Result<(), PayloadError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        (**self).encode(value, sink)
    }

    fn decode<R: Read>(&self, source: &mut R) -> Result<Self::Value, PayloadError> {
        (**self).decode(source)
    }

    fn convert<T: DeserializeOwned>(&self, value: Self::Value) -> Result<T, ConversionError> {
        (**self).convert(value)
    }
}
