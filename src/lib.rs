//! psrp-wire - Remoting message envelope
//!
//! Arsitektur:
//! - Protocol: header 40 byte, dispatch Session / RunspacePool / Pipeline
//! - Payload: kontrak codec + implementasi CBOR + `PoolInitInfo`
//! - Core: capture file untuk inspeksi frame offline (mmap)

pub mod core;
pub mod error;
pub mod payload;
pub mod protocol;

pub use error::{ConversionError, EnvelopeError, FramingError, PayloadError};
pub use payload::{CborCodec, PayloadCodec, PoolInitInfo};
pub use protocol::{Destination, Envelope, EnvelopeHeader, MessageType, TargetScope};
pub use uuid::Uuid;
