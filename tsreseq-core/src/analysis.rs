//! Arrival-order analysis of a recorded stream
//!
//! Looks at datagrams in arrival order, without resequencing them, and
//! reports how disordered the framed sub-packets were and which ones never
//! arrived. Useful for sizing the reorder buffer against a real capture.

use crate::classifier::classify;
use crate::types::{Classified, FramedPacket};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// Sub-indices missing from a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGap {
    /// Frame the gap belongs to
    pub frame_index: u16,

    /// Highest sub-index seen in the frame
    pub last_sub: u16,

    /// Sub-indices below `last_sub` that never arrived
    pub missing: Vec<u16>,
}

/// Summary of a stream's arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalReport {
    /// Total datagrams examined
    pub datagrams: usize,

    /// Raw transport-stream datagrams
    pub passthrough: usize,

    /// Framed sub-packets
    pub framed: usize,

    /// Datagrams the classifier rejected
    pub rejected: usize,

    /// Frames observed
    pub frames_seen: usize,

    /// Framed packets that arrived after a later packet of the stream
    pub late_arrivals: usize,

    /// Framed packets whose key had already been seen in their frame
    pub duplicates: usize,

    /// Largest number of sub-packets a late packet was overtaken by
    pub max_displacement: usize,

    /// Last sub-index seen before each new frame started
    pub turnovers: Vec<u16>,

    /// Frames with missing sub-packets
    pub gaps: Vec<FrameGap>,
}

impl ArrivalReport {
    /// Total number of sub-packets that never arrived
    pub fn missing_total(&self) -> usize {
        self.gaps.iter().map(|g| g.missing.len()).sum()
    }

    /// Smallest reorder capacity that would have absorbed every late packet
    pub fn suggested_capacity(&self) -> usize {
        self.max_displacement + 1
    }
}

#[derive(Debug)]
struct FrameTally {
    frame_index: u16,
    seen: Vec<bool>,
    max_sub: u16,
    count: usize,
}

impl FrameTally {
    fn new(frame_index: u16) -> Self {
        Self {
            frame_index,
            seen: Vec::new(),
            max_sub: 0,
            count: 0,
        }
    }

    /// Mark `sub` as seen; returns false on a duplicate
    fn mark(&mut self, sub: u16) -> bool {
        let index = sub as usize;
        if index >= self.seen.len() {
            self.seen.resize(index + 1, false);
        }
        if self.seen[index] {
            return false;
        }
        self.seen[index] = true;
        self.count += 1;
        true
    }

    fn gap(&self) -> Option<FrameGap> {
        let missing: Vec<u16> = (0..=self.max_sub)
            .filter(|&sub| !self.seen.get(sub as usize).copied().unwrap_or(false))
            .collect();

        if missing.is_empty() {
            None
        } else {
            Some(FrameGap {
                frame_index: self.frame_index,
                last_sub: self.max_sub,
                missing,
            })
        }
    }
}

/// Incremental arrival analyzer
#[derive(Debug, Default)]
pub struct ArrivalAnalyzer {
    report: ArrivalReport,
    current: Option<FrameTally>,
    previous: Option<FrameTally>,
    last_key: Option<(u16, u16)>,
}

impl ArrivalAnalyzer {
    /// Create an empty analyzer
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one datagram
    pub fn observe(&mut self, datagram: Bytes) {
        self.report.datagrams += 1;

        match classify(datagram) {
            Ok(Classified::Passthrough(_)) => self.report.passthrough += 1,
            Ok(Classified::Framed(packet)) => {
                self.report.framed += 1;
                self.observe_framed(&packet);
            }
            Err(_) => self.report.rejected += 1,
        }
    }

    fn observe_framed(&mut self, packet: &FramedPacket) {
        let (frame, sub) = packet.key();

        if packet.starts_frame() {
            if let Some((last_frame, last_sub)) = self.last_key {
                if last_frame != frame {
                    self.report.turnovers.push(last_sub);
                }
            }
        }
        self.last_key = Some((frame, sub));

        let in_previous = self
            .previous
            .as_ref()
            .is_some_and(|t| t.frame_index == frame);
        let in_current = self
            .current
            .as_ref()
            .is_some_and(|t| t.frame_index == frame);

        if in_previous && !in_current {
            let overtaken_by = self.current.as_ref().map_or(0, |t| t.count);
            if let Some(tally) = self.previous.as_mut() {
                let displacement = usize::from(tally.max_sub.saturating_sub(sub)) + overtaken_by;
                Self::record(&mut self.report, tally, sub, Some(displacement));
            }
            return;
        }

        if !in_current {
            self.rotate(frame);
        }

        if let Some(tally) = self.current.as_mut() {
            Self::record(&mut self.report, tally, sub, None);
        }
    }

    fn record(report: &mut ArrivalReport, tally: &mut FrameTally, sub: u16, forced: Option<usize>) {
        let fresh = tally.count == 0;
        if !tally.mark(sub) {
            report.duplicates += 1;
            return;
        }

        let displacement = match forced {
            Some(d) => Some(d),
            None if !fresh && sub < tally.max_sub => Some(usize::from(tally.max_sub - sub)),
            None => None,
        };

        if let Some(d) = displacement {
            report.late_arrivals += 1;
            report.max_displacement = report.max_displacement.max(d);
        }

        if fresh || sub > tally.max_sub {
            tally.max_sub = sub;
        }
    }

    fn rotate(&mut self, frame: u16) {
        if let Some(done) = self.previous.take() {
            self.close(done);
        }
        self.previous = self.current.take();
        self.current = Some(FrameTally::new(frame));
        self.report.frames_seen += 1;
    }

    fn close(&mut self, tally: FrameTally) {
        if let Some(gap) = tally.gap() {
            #[cfg(feature = "logging")]
            debug!(
                "Frame {} is missing {} sub-packets",
                gap.frame_index,
                gap.missing.len()
            );

            self.report.gaps.push(gap);
        }
    }

    /// Close any open frames and return the report
    pub fn finish(mut self) -> ArrivalReport {
        if let Some(done) = self.previous.take() {
            self.close(done);
        }
        if let Some(done) = self.current.take() {
            self.close(done);
        }
        self.report
    }
}

/// Analyze a sequence of datagrams in arrival order
pub fn analyze<I>(datagrams: I) -> ArrivalReport
where
    I: IntoIterator<Item = Bytes>,
{
    let mut analyzer = ArrivalAnalyzer::new();
    for datagram in datagrams {
        analyzer.observe(datagram);
    }
    analyzer.finish()
}
