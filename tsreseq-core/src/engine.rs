//! Datagram routing
//!
//! Glue between the classifier, the resequencer and the output sink. One
//! [`Engine`] handles one stream: every datagram is classified, passthrough
//! data is written at its arrival point, framed packets go through the
//! resequencer, and the reorder buffer is drained before the call returns.

use crate::classifier::classify;
use crate::emitter::Sink;
use crate::error::ReseqError;
use crate::resequencer::{Disposition, Resequencer};
use crate::stats::ReseqStats;
use crate::types::{Classified, ResequencerConfig};
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::warn;

/// How a datagram was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Written verbatim as raw transport stream
    Passthrough,

    /// Handed to the resequencer
    Framed(Disposition),

    /// Could not be classified and was discarded
    Dropped,
}

/// Resequencing engine for one stream
#[derive(Debug)]
pub struct Engine<S: Sink> {
    resequencer: Resequencer,
    sink: S,
    datagrams: u64,
    passthrough: u64,
    framed: u64,
    rejected: u64,
    passthrough_bytes: u64,
}

impl<S: Sink> Engine<S> {
    /// Create an engine with the default config
    pub fn new(sink: S) -> Self {
        Self::with_resequencer(Resequencer::default(), sink)
    }

    /// Create an engine with a custom config
    pub fn with_config(config: ResequencerConfig, sink: S) -> Result<Self, ReseqError> {
        Ok(Self::with_resequencer(Resequencer::new(config)?, sink))
    }

    fn with_resequencer(resequencer: Resequencer, sink: S) -> Self {
        Self {
            resequencer,
            sink,
            datagrams: 0,
            passthrough: 0,
            framed: 0,
            rejected: 0,
            passthrough_bytes: 0,
        }
    }

    /// Classify and route one datagram, then drain whatever became ready
    ///
    /// Unclassifiable datagrams are logged and dropped. Only sink failures
    /// are returned as errors.
    pub fn process(&mut self, datagram: Bytes) -> Result<Routed, ReseqError> {
        self.datagrams += 1;

        let classified = match classify(datagram) {
            Ok(classified) => classified,
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!("Dropping datagram: {}", _e);

                self.rejected += 1;
                return Ok(Routed::Dropped);
            }
        };

        let routed = match classified {
            Classified::Passthrough(data) => {
                self.sink.emit(&data)?;
                self.passthrough += 1;
                self.passthrough_bytes += data.len() as u64;
                Routed::Passthrough
            }
            Classified::Framed(packet) => {
                self.framed += 1;
                Routed::Framed(self.resequencer.push(packet, &mut self.sink)?)
            }
        };

        self.resequencer.drain(&mut self.sink)?;

        Ok(routed)
    }

    /// Process every datagram in order
    pub fn process_all<I>(&mut self, datagrams: I) -> Result<(), ReseqError>
    where
        I: IntoIterator<Item = Bytes>,
    {
        for datagram in datagrams {
            self.process(datagram)?;
        }
        Ok(())
    }

    /// Drain once more at end of input
    ///
    /// Packets still parked behind a missing one stay in the buffer.
    pub fn finish(&mut self) -> Result<usize, ReseqError> {
        self.resequencer.drain(&mut self.sink)
    }

    /// Counters across classification and resequencing
    pub fn stats(&self) -> ReseqStats {
        let mut stats = self.resequencer.stats().clone();
        stats.datagrams = self.datagrams;
        stats.passthrough = self.passthrough;
        stats.framed = self.framed;
        stats.rejected = self.rejected;
        stats.bytes_out += self.passthrough_bytes;
        stats
    }

    /// The resequencer driving framed packets
    pub fn resequencer(&self) -> &Resequencer {
        &self.resequencer
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Recover the sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FramedBuilder;
    use crate::emitter::WriteSink;
    use crate::types::Cursor;

    fn framed(frame: u16, sub: u16) -> Bytes {
        FramedBuilder::new(frame, sub)
            .payload(Bytes::from(format!("{}:{}", frame, sub)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_passthrough_mid_frame_keeps_state() {
        let mut engine = Engine::new(Vec::<Bytes>::new());
        let ts = Bytes::from(vec![0x47u8; 188 * 2]);

        engine.process(framed(5, 0)).unwrap();
        engine.process(framed(5, 2)).unwrap();

        let cursor = engine.resequencer().cursor();
        let buffered = engine.resequencer().buffered();

        assert_eq!(engine.process(ts.clone()).unwrap(), Routed::Passthrough);
        assert_eq!(engine.resequencer().cursor(), cursor);
        assert_eq!(engine.resequencer().buffered(), buffered);

        engine.process(framed(5, 1)).unwrap();

        let out = engine.into_sink();
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].as_ref(), b"5:0");
        assert_eq!(out[1], ts);
        assert_eq!(out[2].as_ref(), b"5:1");
        assert_eq!(out[3].as_ref(), b"5:2");
    }

    #[test]
    fn test_short_datagram_dropped() {
        let mut engine = Engine::new(Vec::<Bytes>::new());

        assert_eq!(engine.process(Bytes::from_static(b"tiny")).unwrap(), Routed::Dropped);
        assert_eq!(engine.resequencer().cursor(), None);

        let stats = engine.stats();
        assert_eq!(stats.datagrams, 1);
        assert_eq!(stats.rejected, 1);
        assert!(engine.sink().is_empty());
    }

    #[test]
    fn test_header_is_stripped() {
        let mut engine = Engine::new(WriteSink::new(Vec::new()));
        engine
            .process_all(vec![framed(1, 7), framed(1, 8)])
            .unwrap();

        assert_eq!(engine.sink().get_ref().as_slice(), b"1:71:8");
        assert_eq!(engine.resequencer().cursor(), Some(Cursor::new(1, 9)));
    }

    #[test]
    fn test_stats_cover_both_paths() {
        let mut engine = Engine::new(Vec::<Bytes>::new());
        engine
            .process_all(vec![
                framed(2, 0),
                Bytes::from(vec![0u8; 188]),
                framed(2, 2),
                framed(2, 1),
            ])
            .unwrap();

        let stats = engine.stats();
        assert_eq!(stats.datagrams, 4);
        assert_eq!(stats.passthrough, 1);
        assert_eq!(stats.framed, 3);
        assert_eq!(stats.emitted_live, 2);
        assert_eq!(stats.emitted_from_buffer, 1);
        assert_eq!(stats.buffered, 1);
        assert_eq!(stats.bytes_out, 188 + 9);
    }

    #[test]
    fn test_with_config_validates() {
        let result = Engine::with_config(ResequencerConfig::with_capacity(0), Vec::<Bytes>::new());
        assert!(result.is_err());
    }
}
