//! Engine counters

use serde::{Deserialize, Serialize};

/// Counters collected while resequencing
///
/// Purely observational; nothing in the engine branches on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReseqStats {
    /// Datagrams handed to the engine
    pub datagrams: u64,

    /// Datagrams passed through as raw transport stream
    pub passthrough: u64,

    /// Datagrams classified as framed sub-packets
    pub framed: u64,

    /// Datagrams dropped because they could not be classified
    pub rejected: u64,

    /// Framed payloads emitted straight from the live stream
    pub emitted_live: u64,

    /// Framed payloads emitted from the reorder buffer
    pub emitted_from_buffer: u64,

    /// Framed packets parked in the reorder buffer
    pub buffered: u64,

    /// Packets dropped because the buffer had no free slot
    pub full_drops: u64,

    /// Buffer-full events outside prebuffering
    pub overflows: u64,

    /// Full resyncs performed after an overflow
    pub resyncs: u64,

    /// Prebuffering phases that ended with a full buffer
    pub prebuffer_completions: u64,

    /// Frames skipped because prebuffering had no context for them
    pub prebuffer_skips: u64,

    /// Bytes written to the sink
    pub bytes_out: u64,
}

impl ReseqStats {
    /// Total framed payloads emitted
    pub fn emitted(&self) -> u64 {
        self.emitted_live + self.emitted_from_buffer
    }

    /// Share of framed packets that had to be buffered, as a percentage
    pub fn reorder_rate(&self) -> f64 {
        if self.framed == 0 {
            0.0
        } else {
            (self.buffered as f64 / self.framed as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_rate() {
        let stats = ReseqStats {
            framed: 200,
            buffered: 50,
            ..Default::default()
        };
        assert!((stats.reorder_rate() - 25.0).abs() < f64::EPSILON);
        assert_eq!(ReseqStats::default().reorder_rate(), 0.0);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = ReseqStats {
            overflows: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["overflows"], 2);
        assert_eq!(json["datagrams"], 0);
    }
}
