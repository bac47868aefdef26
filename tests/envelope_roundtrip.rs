//! End-to-end envelope tests
//!
//! Producer encode -> byte stream -> consumer decode + dispatch,
//! termasuk capture file dan decode paralel antar thread.
//!
//! Usage:
//!   cargo test --test envelope_roundtrip

use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use psrp_wire::core::{CaptureReader, CaptureWriter};
use psrp_wire::payload::{CborCodec, PoolInitInfo};
use psrp_wire::protocol::{
    encode_guid, Destination, DynamicEnvelope, Envelope, EnvelopeHeader, MessageType,
    TargetScope, HEADER_SIZE, RUNSPACE_POOL_MASK,
};
use psrp_wire::{EnvelopeError, FramingError};
use uuid::Uuid;

fn g1() -> Uuid {
    Uuid::parse_str("d7b1c8f2-3a4e-4b6d-8e9f-0a1b2c3d4e5f").unwrap()
}

#[test]
fn test_pool_init_info_scenario() {
    let info = PoolInitInfo::new(1, 5).unwrap();
    let envelope = Envelope::new(
        Destination::CLIENT,
        MessageType::from_u32(RUNSPACE_POOL_MASK),
        g1(),
        Uuid::nil(),
        Some(info),
    );

    let mut wire = Vec::new();
    envelope.encode(&mut wire, &CborCodec).unwrap();
    assert!(wire.len() > HEADER_SIZE);
    assert_eq!(&wire[0..4], &[0x01, 0x00, 0x00, 0x00]);
    assert_eq!(&wire[4..8], &[0x00, 0x10, 0x02, 0x00]);
    assert_eq!(&wire[8..24], &encode_guid(&g1()));
    assert_eq!(&wire[24..40], &[0u8; 16]);

    let mut source = Cursor::new(wire);
    let decoded = Envelope::<PoolInitInfo>::decode(&mut source, &CborCodec).unwrap();

    assert_eq!(decoded.target(), TargetScope::RunspacePool);
    assert_eq!(decoded.destination(), Destination::CLIENT);
    assert_eq!(decoded.runspace_pool_id(), g1());
    assert!(decoded.pipeline_id().is_nil());
    assert_eq!(decoded.data(), Some(&info));
    assert_eq!(decoded, envelope);
}

#[test]
fn test_roundtrip_every_known_message_type() {
    let types = [
        MessageType::SessionCapability,
        MessageType::InitRunspacePool,
        MessageType::ConnectRunspacePool,
        MessageType::SetMaxRunspaces,
        MessageType::RunspacePoolInitData,
        MessageType::RunspacePoolHostResponse,
        MessageType::PipelineInput,
        MessageType::EndOfPipelineInput,
        MessageType::ProgressRecord,
        MessageType::PipelineHostCall,
    ];
    let pipeline = Uuid::from_u128(0xfeed_face_cafe_beef_0000_1111_2222_3333);

    for message_type in types {
        let envelope = Envelope::new(
            Destination::SERVER,
            message_type,
            g1(),
            pipeline,
            Some(vec![1u32, 2, 3]),
        );
        let bytes = envelope.to_bytes(&CborCodec).unwrap();
        let decoded = Envelope::<Vec<u32>>::from_bytes(&bytes, &CborCodec).unwrap();
        assert_eq!(decoded, envelope, "{message_type:?}");
        assert_eq!(decoded.target(), message_type.target());
    }
}

#[test]
fn test_short_sources_never_yield_envelope() {
    let header = EnvelopeHeader::new(
        Destination::CLIENT,
        MessageType::PipelineState,
        g1(),
        Uuid::from_u128(9),
    )
    .encode_to_array();

    for len in [0, 1, 4, 8, 23, 24, 39] {
        let result = Envelope::<i32>::from_bytes(&header[..len], &CborCodec);
        assert!(
            matches!(
                result,
                Err(EnvelopeError::Framing(FramingError::Truncated { .. }))
            ),
            "len {len}"
        );
    }
}

#[test]
fn test_capture_of_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.cap");

    let init = Envelope::new(
        Destination::CLIENT,
        MessageType::RunspacePoolInitData,
        g1(),
        Uuid::nil(),
        Some(PoolInitInfo::new(2, 8).unwrap()),
    );
    let state: Envelope<PoolInitInfo> = Envelope::new(
        Destination::SERVER,
        MessageType::GetAvailableRunspaces,
        g1(),
        Uuid::nil(),
        None,
    );

    let mut writer = CaptureWriter::create(&path).unwrap();
    writer.append_envelope(&init, &CborCodec).unwrap();
    writer.append_envelope(&state, &CborCodec).unwrap();
    assert_eq!(writer.frames_written(), 2);
    writer.finish().unwrap();

    let reader = CaptureReader::open(&path).unwrap();
    let frames: Vec<&[u8]> = reader.frames().map(|f| f.unwrap()).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].len(), HEADER_SIZE);

    let first = Envelope::<PoolInitInfo>::from_bytes(frames[0], &CborCodec).unwrap();
    assert_eq!(first, init);

    let second = DynamicEnvelope::from_bytes(frames[1], &CborCodec).unwrap();
    assert_eq!(second.message_type(), MessageType::GetAvailableRunspaces);
    assert!(second.data().is_none());
}

#[test]
fn test_parallel_decode_of_shared_frame() {
    let envelope = Envelope::new(
        Destination::CLIENT,
        MessageType::PipelineOutput,
        g1(),
        Uuid::from_u128(42),
        Some("output line".to_string()),
    );
    let frame = Arc::new(envelope.to_bytes(&CborCodec).unwrap());
    let expected = Arc::new(envelope);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let frame = Arc::clone(&frame);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                for _ in 0..100 {
                    let decoded = Envelope::<String>::from_bytes(&frame, &CborCodec).unwrap();
                    assert_eq!(decoded, *expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
