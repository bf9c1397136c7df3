//! Datagram classification
//!
//! Every received datagram is either raw transport-stream data (a whole
//! number of 188-byte packets) or a framed sub-packet whose 12-byte header
//! carries the frame index (bytes 2..4) and sub-index (bytes 8..10), both
//! big-endian.

use crate::constants::{
    is_ts_aligned, FRAMED_HEADER_SIZE, FRAME_INDEX_OFFSET, MAX_DATAGRAM_SIZE, SUB_INDEX_OFFSET,
};
use crate::error::ReseqError;
use crate::types::{Classified, FramedPacket};
use bytes::Bytes;

/// Classify a datagram without copying its payload
///
/// The returned passthrough bytes or framed payload are slices of `datagram`.
pub fn classify(datagram: Bytes) -> Result<Classified, ReseqError> {
    if datagram.len() > MAX_DATAGRAM_SIZE {
        return Err(ReseqError::DatagramTooLarge(
            datagram.len(),
            MAX_DATAGRAM_SIZE,
        ));
    }

    if is_ts_aligned(datagram.len()) {
        return Ok(Classified::Passthrough(datagram));
    }

    let (frame_index, sub_index) = read_counters(&datagram)?;
    let payload = datagram.slice(FRAMED_HEADER_SIZE..);

    Ok(Classified::Framed(FramedPacket::new(
        frame_index,
        sub_index,
        payload,
    )))
}

/// Classify a borrowed datagram, copying it once into owned storage
pub fn classify_slice(datagram: &[u8]) -> Result<Classified, ReseqError> {
    classify(Bytes::copy_from_slice(datagram))
}

/// Read the `(frame_index, sub_index)` counters from a framing header
pub fn read_counters(header: &[u8]) -> Result<(u16, u16), ReseqError> {
    if header.len() < FRAMED_HEADER_SIZE {
        return Err(ReseqError::ShortDatagram {
            expected: FRAMED_HEADER_SIZE,
            actual: header.len(),
        });
    }

    let frame_index = u16::from_be_bytes([
        header[FRAME_INDEX_OFFSET],
        header[FRAME_INDEX_OFFSET + 1],
    ]);
    let sub_index = u16::from_be_bytes([header[SUB_INDEX_OFFSET], header[SUB_INDEX_OFFSET + 1]]);

    Ok((frame_index, sub_index))
}
