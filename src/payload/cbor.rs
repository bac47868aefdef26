//! CBOR payload codec (ciborium)
//!
//! Satu payload = satu item CBOR. Byte sisa setelah item pertama
//! dianggap payload rusak.

use std::io::{Read, Write};

use ciborium::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::PayloadCodec;
use crate::error::{ConversionError, PayloadError};

/// Payload codec berbasis CBOR.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl CborCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadCodec for CborCodec {
    type Value = Value;

    fn encode<T, W>(&self, value: &T, sink: &mut W) -> Result<(), PayloadError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        ciborium::into_writer(value, sink).map_err(|e| PayloadError::Encode(e.to_string()))
    }

    fn decode<R: Read>(&self, source: &mut R) -> Result<Value, PayloadError> {
        let value: Value =
            ciborium::from_reader(&mut *source).map_err(|e| PayloadError::Decode(e.to_string()))?;

        let mut extra = [0u8; 1];
        match source.read(&mut extra) {
            Ok(0) => Ok(value),
            Ok(_) => Err(PayloadError::Decode(
                "trailing bytes after payload".to_string(),
            )),
            Err(e) => Err(PayloadError::Decode(e.to_string())),
        }
    }

    fn convert<T: DeserializeOwned>(&self, value: Value) -> Result<T, ConversionError> {
        value
            .deserialized::<T>()
            .map_err(|e| ConversionError::mismatch::<T>(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_encode_decode_convert() {
        let codec = CborCodec::new();
        let sample = Sample {
            name: "pool".to_string(),
            count: 3,
        };

        let mut buf = Vec::new();
        codec.encode(&sample, &mut buf).unwrap();

        let value = codec.decode(&mut buf.as_slice()).unwrap();
        let back: Sample = codec.convert(value).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let codec = CborCodec::new();
        // 0xFF = break tanpa indefinite item
        let err = codec.decode(&mut &[0xFFu8][..]).unwrap_err();
        assert!(matches!(err, PayloadError::Decode(_)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let codec = CborCodec::new();
        let mut buf = Vec::new();
        codec.encode(&7u32, &mut buf).unwrap();
        buf.push(0x01);

        let err = codec.decode(&mut buf.as_slice()).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn test_convert_mismatch() {
        let codec = CborCodec::new();
        let err = codec
            .convert::<Sample>(Value::Text("not a map".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConversionError::Mismatch { .. }));
    }
}
