//! Protocol Layer: remoting envelope
//!
//! Prinsip desain:
//! - Fixed-size header: 40 byte, layout wire contract dengan peer
//! - Little-endian integers, GUID dalam layout mixed-endian peer
//! - Dispatch via tabel mask ber-urutan, bukan kebetulan numerik
//! - Payload didelegasikan ke `PayloadCodec`

mod envelope;
mod message;
mod primitives;

pub use envelope::{
    DynamicEnvelope, Envelope, EnvelopeHeader, DESTINATION_OFFSET, HEADER_SIZE,
    MESSAGE_TYPE_OFFSET, PIPELINE_ID_OFFSET, RUNSPACE_POOL_ID_OFFSET,
};
pub use message::{
    resolve, Destination, MessageType, TargetScope, DISPATCH_ORDER, PIPELINE_MASK,
    RUNSPACE_POOL_MASK, SESSION_MASK,
};
pub use primitives::{decode_guid, decode_u32, encode_guid, encode_u32, GUID_SIZE, U32_SIZE};
