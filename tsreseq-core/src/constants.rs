//! Constants and limits for the framed transport-stream feed

/// Size of one MPEG transport-stream packet
pub const TS_PACKET_SIZE: usize = 188;

/// Size of the framing header that precedes every framed payload
pub const FRAMED_HEADER_SIZE: usize = 12;

/// Byte offset of the big-endian 16-bit frame index inside the header
pub const FRAME_INDEX_OFFSET: usize = 2;

/// Byte offset of the big-endian 16-bit sub-index inside the header
pub const SUB_INDEX_OFFSET: usize = 8;

/// Theoretical maximum size of a UDP datagram
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Default number of reorder slots
pub const DEFAULT_REORDER_CAPACITY: usize = 15;

/// Default wrap period of the frame index cursor (255 -> 0)
///
/// The header field is 16 bits wide but the cursor wraps at 256.
pub const DEFAULT_FRAME_PERIOD: u16 = 256;

/// Magic bytes at the start of a capture file
pub const CAPTURE_MAGIC: &[u8; 8] = b"TSRQCAP1";

/// Size of the length prefix in front of every capture record
pub const CAPTURE_RECORD_PREFIX: usize = 4;

/// Returns true if `len` is a whole number of transport-stream packets
pub const fn is_ts_aligned(len: usize) -> bool {
    len % TS_PACKET_SIZE == 0
}
