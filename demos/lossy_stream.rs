//! Resequencing a shuffled stream with losses

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tsreseq_core::{builder::FramedBuilder, Engine, Sink, WriteSink};

const FRAMES: u16 = 8;
const SUBS_PER_FRAME: u16 = 40;

/// Sink that only checks ordering
struct OrderCheck {
    last: Option<(u16, u16)>,
    out_of_order: usize,
    inner: WriteSink<std::io::Sink>,
}

impl Sink for OrderCheck {
    fn emit(&mut self, chunk: &[u8]) -> Result<(), tsreseq_core::ReseqError> {
        let frame = u16::from_be_bytes([chunk[0], chunk[1]]);
        let sub = u16::from_be_bytes([chunk[2], chunk[3]]);
        if let Some(last) = self.last {
            if (frame, sub) < last {
                self.out_of_order += 1;
            }
        }
        self.last = Some((frame, sub));
        self.inner.emit(chunk)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("tsreseq Lossy Stream Example\n");

    let mut rng = StdRng::seed_from_u64(7);

    let mut wire = Vec::new();
    for frame in 0..FRAMES {
        let mut subs: Vec<u16> = (0..SUBS_PER_FRAME).collect();

        // Local disorder in windows of six
        for window in subs.chunks_mut(6) {
            window.shuffle(&mut rng);
        }

        for sub in subs {
            // Lose about one packet in a hundred
            if rng.gen_ratio(1, 100) {
                println!("Dropped ({}, {}) on the wire", frame, sub);
                continue;
            }

            let mut payload = Vec::with_capacity(4);
            payload.extend_from_slice(&frame.to_be_bytes());
            payload.extend_from_slice(&sub.to_be_bytes());
            wire.push(FramedBuilder::new(frame, sub).payload(Bytes::from(payload)).build()?);
        }
    }

    let sink = OrderCheck {
        last: None,
        out_of_order: 0,
        inner: WriteSink::new(std::io::sink()),
    };
    let mut engine = Engine::new(sink);
    engine.process_all(wire)?;
    engine.finish()?;

    let stats = engine.stats();
    println!("\n=== Results ===");
    println!("Framed in:       {}", stats.framed);
    println!("Emitted:         {}", stats.emitted());
    println!("Still buffered:  {}", engine.resequencer().buffered());
    println!("Overflows:       {}", stats.overflows);
    println!("Resyncs:         {}", stats.resyncs);
    println!("Out of order:    {}", engine.sink().out_of_order);
    println!("Bytes written:   {}", engine.sink().inner.bytes_written());

    Ok(())
}
