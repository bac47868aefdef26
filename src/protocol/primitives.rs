//! Fixed-width primitives: little-endian u32 dan GUID 16 byte
//!
//! Semua decode bersifat strict: input pendek langsung jadi
//! `FramingError`, tidak pernah di-substitusi dengan nilai sentinel.

use uuid::Uuid;

use crate::error::FramingError;

pub const U32_SIZE: usize = 4;
pub const GUID_SIZE: usize = 16;

/// Encode u32 ke 4 byte little-endian
#[inline(always)]
pub fn encode_u32(v: u32) -> [u8; U32_SIZE] {
    let mut out = [0u8; U32_SIZE];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = ((v >> (8 * i)) & 0xFF) as u8;
    }
    out
}

/// Decode u32 dari tepat 4 byte little-endian.
#[inline(always)]
pub fn decode_u32(bytes: &[u8]) -> Result<u32, FramingError> {
    decode_u32_field("u32", bytes)
}

#[inline(always)]
pub(crate) fn decode_u32_field(field: &'static str, bytes: &[u8]) -> Result<u32, FramingError> {
    let raw: [u8; U32_SIZE] = bytes.try_into().map_err(|_| FramingError::Truncated {
        field,
        needed: U32_SIZE,
        available: bytes.len(),
    })?;
    Ok(u32::from_le_bytes(raw))
}

/// Encode GUID ke layout binary peer.
///
/// Layout-nya mixed-endian: `Data1` (u32), `Data2` dan `Data3` (u16)
/// little-endian, `Data4` apa adanya.
#[inline(always)]
pub fn encode_guid(guid: &Uuid) -> [u8; GUID_SIZE] {
    guid.to_bytes_le()
}

/// Decode GUID dari tepat 16 byte.
#[inline(always)]
pub fn decode_guid(bytes: &[u8]) -> Result<Uuid, FramingError> {
    decode_guid_field("guid", bytes)
}

#[inline(always)]
pub(crate) fn decode_guid_field(field: &'static str, bytes: &[u8]) -> Result<Uuid, FramingError> {
    let raw: [u8; GUID_SIZE] = bytes.try_into().map_err(|_| FramingError::Truncated {
        field,
        needed: GUID_SIZE,
        available: bytes.len(),
    })?;
    Ok(Uuid::from_bytes_le(raw))
}
