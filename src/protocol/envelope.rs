//! Envelope: header 40 byte + payload opsional
//!
//! Layout:
//! ┌────────┬──────────────────┬──────┐
//! │ Offset │ Field            │ Size │
//! ├────────┼──────────────────┼──────┤
//! │ 0      │ Destination      │ 4    │
//! │ 4      │ MessageType      │ 4    │
//! │ 8      │ RunspacePoolId   │ 16   │
//! │ 24     │ PipelineId       │ 16   │
//! │ 40     │ Payload (codec)  │ var  │
//! └────────┴──────────────────┴──────┘
//!
//! Semua integer little-endian. Frame tanpa byte setelah header adalah
//! header-only message yang valid.

use std::io::{BufRead, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use uuid::Uuid;

use super::message::{Destination, MessageType, TargetScope};
use super::primitives::{
    decode_guid_field, decode_u32_field, encode_guid, encode_u32, GUID_SIZE, U32_SIZE,
};
use crate::error::{EnvelopeError, FramingError, Result};
use crate::payload::PayloadCodec;

pub const DESTINATION_OFFSET: usize = 0;
pub const MESSAGE_TYPE_OFFSET: usize = DESTINATION_OFFSET + U32_SIZE;
pub const RUNSPACE_POOL_ID_OFFSET: usize = MESSAGE_TYPE_OFFSET + U32_SIZE;
pub const PIPELINE_ID_OFFSET: usize = RUNSPACE_POOL_ID_OFFSET + GUID_SIZE;
pub const HEADER_SIZE: usize = PIPELINE_ID_OFFSET + GUID_SIZE;

/// Fixed header sebuah frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvelopeHeader {
    destination: Destination,
    message_type: MessageType,
    runspace_pool_id: Uuid,
    pipeline_id: Uuid,
}

impl EnvelopeHeader {
    pub fn new(
        destination: Destination,
        message_type: MessageType,
        runspace_pool_id: Uuid,
        pipeline_id: Uuid,
    ) -> Self {
        Self {
            destination,
            message_type,
            runspace_pool_id,
            pipeline_id,
        }
    }

    #[inline(always)]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    #[inline(always)]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    #[inline(always)]
    pub fn runspace_pool_id(&self) -> Uuid {
        self.runspace_pool_id
    }

    /// Nil GUID jika message hanya untuk pool.
    #[inline(always)]
    pub fn pipeline_id(&self) -> Uuid {
        self.pipeline_id
    }

    #[inline(always)]
    pub fn target(&self) -> TargetScope {
        self.message_type.target()
    }

    /// Serialize header ke 40 byte
    pub fn encode_to_array(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[DESTINATION_OFFSET..MESSAGE_TYPE_OFFSET]
            .copy_from_slice(&encode_u32(self.destination.as_u32()));
        buf[MESSAGE_TYPE_OFFSET..RUNSPACE_POOL_ID_OFFSET]
            .copy_from_slice(&encode_u32(self.message_type.as_u32()));
        buf[RUNSPACE_POOL_ID_OFFSET..PIPELINE_ID_OFFSET]
            .copy_from_slice(&encode_guid(&self.runspace_pool_id));
        buf[PIPELINE_ID_OFFSET..HEADER_SIZE].copy_from_slice(&encode_guid(&self.pipeline_id));
        buf
    }

    /// Decode header dari awal frame tanpa menyentuh payload.
    ///
    /// Dipakai router yang hanya perlu dispatch.
    pub fn peek(frame: &[u8]) -> std::result::Result<Self, FramingError> {
        let header = frame.get(..HEADER_SIZE).ok_or(FramingError::Truncated {
            field: "header",
            needed: HEADER_SIZE,
            available: frame.len(),
        })?;

        Ok(Self {
            destination: Destination::from_u32(decode_u32_field(
                "destination",
                &header[DESTINATION_OFFSET..MESSAGE_TYPE_OFFSET],
            )?),
            message_type: MessageType::from_u32(decode_u32_field(
                "message type",
                &header[MESSAGE_TYPE_OFFSET..RUNSPACE_POOL_ID_OFFSET],
            )?),
            runspace_pool_id: decode_guid_field(
                "runspace pool id",
                &header[RUNSPACE_POOL_ID_OFFSET..PIPELINE_ID_OFFSET],
            )?,
            pipeline_id: decode_guid_field(
                "pipeline id",
                &header[PIPELINE_ID_OFFSET..HEADER_SIZE],
            )?,
        })
    }

    /// Baca tepat 40 byte dari source lalu decode.
    fn read_from<R: BufRead>(source: &mut R) -> std::result::Result<Self, FramingError> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            match source.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(FramingError::Truncated {
                        field: "header",
                        needed: HEADER_SIZE,
                        available: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(FramingError::Io(e)),
            }
        }
        Self::peek(&buf)
    }
}

/// Message ter-address dengan payload ber-tipe `T`.
///
/// Immutable setelah dibuat. Satu instance = satu message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    header: EnvelopeHeader,
    data: Option<T>,
}

/// Envelope dengan payload untyped dari codec CBOR.
pub type DynamicEnvelope = Envelope<ciborium::Value>;

impl<T> Envelope<T> {
    /// Selalu berhasil; tidak ada validasi field selain tipe.
    pub fn new(
        destination: Destination,
        message_type: MessageType,
        runspace_pool_id: Uuid,
        pipeline_id: Uuid,
        data: Option<T>,
    ) -> Self {
        Self {
            header: EnvelopeHeader::new(destination, message_type, runspace_pool_id, pipeline_id),
            data,
        }
    }

    pub fn from_header(header: EnvelopeHeader, data: Option<T>) -> Self {
        Self { header, data }
    }

    #[inline(always)]
    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    #[inline(always)]
    pub fn destination(&self) -> Destination {
        self.header.destination
    }

    #[inline(always)]
    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    #[inline(always)]
    pub fn runspace_pool_id(&self) -> Uuid {
        self.header.runspace_pool_id
    }

    #[inline(always)]
    pub fn pipeline_id(&self) -> Uuid {
        self.header.pipeline_id
    }

    #[inline(always)]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Target scope (Session / RunspacePool / Pipeline / Invalid).
    #[inline(always)]
    pub fn target(&self) -> TargetScope {
        self.header.target()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_parts(self) -> (EnvelopeHeader, Option<T>) {
        (self.header, self.data)
    }
}

impl<T: Serialize> Envelope<T> {
    /// Tulis frame ke sink: header dulu, lalu payload jika ada.
    pub fn encode<W, C>(&self, sink: &mut W, codec: &C) -> Result<()>
    where
        W: Write,
        C: PayloadCodec,
    {
        sink.write_all(&self.header.encode_to_array())?;

        if let Some(data) = &self.data {
            codec
                .encode(data, sink)
                .map_err(EnvelopeError::PayloadEncode)?;
        }

        trace!(
            destination = ?self.header.destination,
            message_type = ?self.header.message_type,
            runspace_pool_id = %self.header.runspace_pool_id,
            pipeline_id = %self.header.pipeline_id,
            has_payload = self.data.is_some(),
            "encoded envelope"
        );
        Ok(())
    }

    /// Encode ke Vec baru.
    pub fn to_bytes<C: PayloadCodec>(&self, codec: &C) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        self.encode(&mut buf, codec)?;
        Ok(buf)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode satu frame dari source.
    ///
    /// Source harus sudah berisi frame lengkap (payload sudah
    /// ter-reassemble). Gagal di tahap mana pun berarti tidak ada
    /// envelope yang dikembalikan.
    pub fn decode<R, C>(source: &mut R, codec: &C) -> Result<Self>
    where
        R: BufRead,
        C: PayloadCodec,
    {
        let header = EnvelopeHeader::read_from(source).map_err(|e| {
            debug!(error = %e, "envelope header decode failed");
            EnvelopeError::Framing(e)
        })?;

        let has_payload = !source.fill_buf().map_err(FramingError::Io)?.is_empty();
        let data = if has_payload {
            let value = codec.decode(source).map_err(|e| {
                debug!(
                    message_type = ?header.message_type,
                    error = %e,
                    "envelope payload decode failed"
                );
                EnvelopeError::PayloadDecode(e)
            })?;
            Some(codec.convert::<T>(value).map_err(|e| {
                debug!(
                    message_type = ?header.message_type,
                    error = %e,
                    "envelope payload conversion failed"
                );
                EnvelopeError::Conversion(e)
            })?)
        } else {
            None
        };

        trace!(
            destination = ?header.destination,
            message_type = ?header.message_type,
            runspace_pool_id = %header.runspace_pool_id,
            pipeline_id = %header.pipeline_id,
            has_payload,
            "decoded envelope"
        );
        Ok(Self { header, data })
    }

    /// Decode dari satu frame utuh di memory.
    pub fn from_bytes<C: PayloadCodec>(frame: &[u8], codec: &C) -> Result<Self> {
        let mut source = frame;
        Self::decode(&mut source, codec)
    }
}
