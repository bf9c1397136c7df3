//! Framed datagram encoding
//!
//! Produces datagrams in the same layout the camera emits, for replay
//! fixtures, benches and tests.

use crate::constants::{
    FRAMED_HEADER_SIZE, FRAME_INDEX_OFFSET, MAX_DATAGRAM_SIZE, SUB_INDEX_OFFSET,
};
use crate::error::ReseqError;
use crate::types::FramedPacket;
use bytes::{BufMut, Bytes, BytesMut};

/// Encode a framed datagram
///
/// Layout:
/// 1. Header (12 bytes):
///    - bytes 0..2: version/flags (copied from `prefix`)
///    - bytes 2..4: frame index (big-endian)
///    - bytes 4..8: opaque (copied from `opaque`)
///    - bytes 8..10: sub-index (big-endian)
///    - bytes 10..12: opaque (copied from `tail`)
/// 2. Payload (variable length)
///
/// A datagram whose total length lands on a multiple of 188 is
/// indistinguishable from raw transport-stream data and will be passed
/// through by the classifier.
pub fn encode_framed(packet: &FramedPacket) -> Result<Bytes, ReseqError> {
    FramedBuilder::new(packet.frame_index, packet.sub_index)
        .payload(packet.payload.clone())
        .build()
}

/// Builder for framed datagrams
#[derive(Debug, Clone)]
pub struct FramedBuilder {
    frame_index: u16,
    sub_index: u16,
    prefix: [u8; 2],
    opaque: [u8; 4],
    tail: [u8; 2],
    payload: Bytes,
}

impl FramedBuilder {
    /// Create a new builder for the given counters
    pub fn new(frame_index: u16, sub_index: u16) -> Self {
        Self {
            frame_index,
            sub_index,
            prefix: [0x80, 0x21],
            opaque: [0u8; 4],
            tail: [0u8; 2],
            payload: Bytes::new(),
        }
    }

    /// Set the payload
    pub fn payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// Set the header bytes the classifier ignores
    pub fn opaque_header(mut self, prefix: [u8; 2], opaque: [u8; 4], tail: [u8; 2]) -> Self {
        self.prefix = prefix;
        self.opaque = opaque;
        self.tail = tail;
        self
    }

    /// Build and encode the datagram
    pub fn build(self) -> Result<Bytes, ReseqError> {
        let total_size = FRAMED_HEADER_SIZE + self.payload.len();
        if total_size > MAX_DATAGRAM_SIZE {
            return Err(ReseqError::DatagramTooLarge(total_size, MAX_DATAGRAM_SIZE));
        }

        let mut buf = BytesMut::with_capacity(total_size);
        buf.put_slice(&self.prefix);
        debug_assert_eq!(buf.len(), FRAME_INDEX_OFFSET);
        buf.put_u16(self.frame_index);
        buf.put_slice(&self.opaque);
        debug_assert_eq!(buf.len(), SUB_INDEX_OFFSET);
        buf.put_u16(self.sub_index);
        buf.put_slice(&self.tail);
        buf.put_slice(&self.payload);

        Ok(buf.freeze())
    }

    /// Build the packet struct without encoding
    pub fn build_packet(self) -> FramedPacket {
        FramedPacket::new(self.frame_index, self.sub_index, self.payload)
    }
}
