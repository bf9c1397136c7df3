//! Core types for framed datagrams and engine configuration

use crate::constants::{DEFAULT_FRAME_PERIOD, DEFAULT_REORDER_CAPACITY};
use crate::error::ReseqError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A sub-packet of the framed feed, with its framing header stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedPacket {
    /// Outer frame counter
    pub frame_index: u16,

    /// Position of this sub-packet inside its frame
    pub sub_index: u16,

    /// Bytes following the 12-byte framing header
    pub payload: Bytes,
}

impl FramedPacket {
    /// Create a new framed packet
    pub fn new(frame_index: u16, sub_index: u16, payload: Bytes) -> Self {
        Self {
            frame_index,
            sub_index,
            payload,
        }
    }

    /// The `(frame_index, sub_index)` pair this packet is ordered by
    pub fn key(&self) -> (u16, u16) {
        (self.frame_index, self.sub_index)
    }

    /// Returns true if this packet opens a new frame
    pub fn starts_frame(&self) -> bool {
        self.sub_index == 0
    }
}

/// Result of classifying one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Already well-ordered transport-stream packets, emitted verbatim
    Passthrough(Bytes),

    /// A framed sub-packet that has to go through the resequencer
    Framed(FramedPacket),
}

/// The next `(frame, sub)` pair the resequencer expects to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Expected frame index
    pub frame: u16,

    /// Expected sub-index within `frame`
    pub sub: u16,
}

impl Cursor {
    /// Create a cursor at the given position
    pub const fn new(frame: u16, sub: u16) -> Self {
        Self { frame, sub }
    }

    /// Returns true if `packet` is the one this cursor is waiting for
    pub fn matches(&self, packet: &FramedPacket) -> bool {
        self.frame == packet.frame_index && self.sub == packet.sub_index
    }

    /// Move to sub-index 0 of the next frame, wrapping at `period`
    pub fn roll_frame(&mut self, period: u16) {
        self.frame = ((u32::from(self.frame) + 1) % u32::from(period)) as u16;
        self.sub = 0;
    }

    /// Advance past the packet just serviced
    ///
    /// Rolls to the next frame when the current sub-index is the recorded
    /// turnover (clearing it), otherwise steps the sub-index.
    pub fn advance(&mut self, turnover: &mut Option<u16>, period: u16) {
        if *turnover == Some(self.sub) {
            self.roll_frame(period);
            *turnover = None;
        } else {
            self.sub = self.sub.wrapping_add(1);
        }
    }
}

/// Tunables for a resequencer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResequencerConfig {
    /// Number of reorder slots
    pub capacity: usize,

    /// Wrap period of the frame index cursor
    pub frame_period: u16,
}

impl ResequencerConfig {
    /// Create a config with the given capacity and the default frame period
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            frame_period: DEFAULT_FRAME_PERIOD,
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ReseqError> {
        if self.capacity == 0 {
            return Err(ReseqError::InvalidConfig(
                "reorder capacity must be at least 1".to_string(),
            ));
        }

        if self.frame_period == 0 {
            return Err(ReseqError::InvalidConfig(
                "frame period must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ResequencerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_REORDER_CAPACITY,
            frame_period: DEFAULT_FRAME_PERIOD,
        }
    }
}
