//! Frame/sub-index resequencing
//!
//! The resequencer owns the expected `(frame, sub)` cursor and a small
//! [`ReorderBuffer`]. Each framed packet is either emitted on the spot (it is
//! the one the cursor is waiting for) or parked in the buffer; [`Resequencer::drain`]
//! then releases parked packets as the cursor reaches them.
//!
//! Two mechanisms move the cursor across frame boundaries:
//! - **Turnover**: when sub-index 0 of a new frame arrives while packets are
//!   still parked, the last sub-index seen is recorded. The cursor rolls to
//!   the next frame right after servicing that sub-index.
//! - **Prebuffering**: when sub-index 0 arrives with nothing parked, the end
//!   of the current frame is unknown (unless that packet is the one seeding
//!   the cursor). Packets are parked until the buffer fills, and the drain then
//!   skips the cursor ahead to the next frame once the current one runs dry.
//!
//! A buffer that fills outside prebuffering is an overflow: the cursor skips
//! the missing packet and the next packet forces a full resync.

use crate::emitter::Sink;
use crate::error::ReseqError;
use crate::reorder::ReorderBuffer;
use crate::stats::ReseqStats;
use crate::types::{Cursor, FramedPacket, ResequencerConfig};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// What happened to a packet handed to [`Resequencer::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Matched the cursor and was written immediately
    Emitted,

    /// Parked in the reorder buffer
    Buffered,

    /// Filled the buffer while prebuffering; prebuffering is over
    PrebufferComplete,

    /// Filled the buffer outside prebuffering; a resync is scheduled
    Overflow,
}

/// Conceptual state of the resequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReseqState {
    /// No packet seen yet, cursor unset
    Seeking,

    /// Matching and draining against the cursor
    Live,

    /// Parking packets until the frame boundary is known
    Prebuffering,

    /// The next packet clears the buffer and reseeds the cursor
    ResyncPending,
}

/// Resequencing state machine for one stream
#[derive(Debug, Clone)]
pub struct Resequencer {
    config: ResequencerConfig,
    buffer: ReorderBuffer,
    cursor: Option<Cursor>,
    prebuffering: bool,
    was_prebuffering: bool,
    pending_resync: bool,
    turnover: Option<u16>,
    last_sub_seen: Option<u16>,
    stats: ReseqStats,
}

impl Resequencer {
    /// Create a resequencer from a validated config
    pub fn new(config: ResequencerConfig) -> Result<Self, ReseqError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: ResequencerConfig) -> Self {
        Self {
            config,
            buffer: ReorderBuffer::new(config.capacity),
            cursor: None,
            prebuffering: false,
            was_prebuffering: false,
            pending_resync: false,
            turnover: None,
            last_sub_seen: None,
            stats: ReseqStats::default(),
        }
    }

    /// Handle one framed packet
    ///
    /// Writes to `sink` only when the packet is the one the cursor expects.
    /// Call [`Resequencer::drain`] afterwards to release parked packets.
    pub fn push<S: Sink>(
        &mut self,
        packet: FramedPacket,
        sink: &mut S,
    ) -> Result<Disposition, ReseqError> {
        let (mut cursor, seeded) = self.seed(&packet);

        if packet.starts_frame() {
            if self.buffer.is_empty() {
                // The packet that just set the cursor is emitted as-is
                if !seeded {
                    #[cfg(feature = "logging")]
                    debug!(
                        "Frame {} started with nothing parked, prebuffering",
                        packet.frame_index
                    );

                    self.prebuffering = true;
                }
            } else {
                self.turnover = self.last_sub_seen;
            }
        }

        // Nothing parked: follow the live stream's frame counter
        if !self.prebuffering && self.buffer.is_empty() && packet.frame_index != cursor.frame {
            cursor.frame = packet.frame_index;
        }

        self.last_sub_seen = Some(packet.sub_index);

        if !self.prebuffering && cursor.matches(&packet) {
            sink.emit(&packet.payload)?;
            cursor.sub = cursor.sub.wrapping_add(1);
            self.cursor = Some(cursor);
            self.stats.emitted_live += 1;
            self.stats.bytes_out += packet.payload.len() as u64;
            return Ok(Disposition::Emitted);
        }

        self.cursor = Some(cursor);
        Ok(self.park(packet))
    }

    /// Release parked packets that match the cursor, in order
    ///
    /// Returns the number of payloads written.
    pub fn drain<S: Sink>(&mut self, sink: &mut S) -> Result<usize, ReseqError> {
        let period = self.config.frame_period;
        let mut emitted = 0;

        while !self.buffer.is_empty() && !self.prebuffering {
            let Some(mut cursor) = self.cursor else {
                break;
            };

            match self.buffer.take_matching(cursor) {
                Some(packet) => {
                    sink.emit(&packet.payload)?;
                    cursor.advance(&mut self.turnover, period);
                    self.cursor = Some(cursor);
                    self.stats.emitted_from_buffer += 1;
                    self.stats.bytes_out += packet.payload.len() as u64;
                    emitted += 1;
                }
                None if self.was_prebuffering => {
                    cursor.roll_frame(period);

                    #[cfg(feature = "logging")]
                    debug!(
                        "Prebuffered frame boundary reached, skipping to frame {}",
                        cursor.frame
                    );

                    self.cursor = Some(cursor);
                    self.was_prebuffering = false;
                    self.stats.prebuffer_skips += 1;
                }
                None => break,
            }
        }

        Ok(emitted)
    }

    /// Forget all state and start seeking again
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = None;
        self.prebuffering = false;
        self.was_prebuffering = false;
        self.pending_resync = false;
        self.turnover = None;
        self.last_sub_seen = None;
    }

    /// Current conceptual state
    pub fn state(&self) -> ReseqState {
        if self.pending_resync {
            ReseqState::ResyncPending
        } else if self.cursor.is_none() {
            ReseqState::Seeking
        } else if self.prebuffering {
            ReseqState::Prebuffering
        } else {
            ReseqState::Live
        }
    }

    /// The next `(frame, sub)` expected, once seeded
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Sub-index at which the cursor rolls to the next frame
    pub fn turnover(&self) -> Option<u16> {
        self.turnover
    }

    /// Returns true while parking packets for an unknown frame boundary
    pub fn is_prebuffering(&self) -> bool {
        self.prebuffering
    }

    /// Returns true if a finished prebuffer still allows one frame skip
    pub fn was_prebuffering(&self) -> bool {
        self.was_prebuffering
    }

    /// Returns true if the next packet forces a full resync
    pub fn resync_pending(&self) -> bool {
        self.pending_resync
    }

    /// Number of parked packets
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Read-only view of the reorder buffer
    pub fn buffer(&self) -> &ReorderBuffer {
        &self.buffer
    }

    /// The config this instance was built with
    pub fn config(&self) -> &ResequencerConfig {
        &self.config
    }

    /// Counters collected so far
    pub fn stats(&self) -> &ReseqStats {
        &self.stats
    }

    /// Apply a pending resync and seed the cursor on first use
    ///
    /// Returns the cursor and whether this packet set it.
    fn seed(&mut self, packet: &FramedPacket) -> (Cursor, bool) {
        let incoming = Cursor::new(packet.frame_index, packet.sub_index);

        if self.pending_resync {
            #[cfg(feature = "logging")]
            debug!(
                "Resyncing at ({}, {}), discarding {} buffered packets",
                incoming.frame,
                incoming.sub,
                self.buffer.len()
            );

            self.buffer.clear();
            self.cursor = Some(incoming);
            self.pending_resync = false;
            self.stats.resyncs += 1;
            return (incoming, true);
        }

        match self.cursor {
            Some(cursor) => (cursor, false),
            None => {
                self.cursor = Some(incoming);
                (incoming, true)
            }
        }
    }

    /// Park a packet and handle a buffer that just filled up
    fn park(&mut self, packet: FramedPacket) -> Disposition {
        #[cfg(feature = "logging")]
        let (frame, sub) = packet.key();

        match self.buffer.insert(packet) {
            Ok(_) => self.stats.buffered += 1,
            Err(_rejected) => {
                #[cfg(feature = "logging")]
                debug!(
                    "No free slot for ({}, {}), dropping",
                    _rejected.frame_index, _rejected.sub_index
                );

                self.stats.full_drops += 1;
            }
        }

        if !self.buffer.is_full() {
            return Disposition::Buffered;
        }

        if self.prebuffering {
            self.prebuffering = false;
            self.was_prebuffering = true;
            self.stats.prebuffer_completions += 1;
            return Disposition::PrebufferComplete;
        }

        if let Some(cursor) = self.cursor.as_mut() {
            #[cfg(feature = "logging")]
            warn!(
                "Reorder buffer full ({} slots) at ({}, {}) waiting for ({}, {}), skipping ahead",
                self.buffer.capacity(),
                frame,
                sub,
                cursor.frame,
                cursor.sub
            );

            cursor.advance(&mut self.turnover, self.config.frame_period);
        }

        self.pending_resync = true;
        self.stats.overflows += 1;
        Disposition::Overflow
    }
}

impl Default for Resequencer {
    fn default() -> Self {
        Self::from_config(ResequencerConfig::default())
    }
}
