use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tsreseq_core::{builder::FramedBuilder, Engine, ResequencerConfig};

/// Frames of `per_frame` sub-packets, shuffled in windows of `window`
fn make_stream(frames: u16, per_frame: u16, window: usize) -> Vec<Bytes> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut stream = Vec::new();

    for frame in 0..frames {
        let mut subs: Vec<u16> = (0..per_frame).collect();
        // Keep sub 0 first so every frame boundary is seen in place
        for chunk in subs[1..].chunks_mut(window.max(1)) {
            chunk.shuffle(&mut rng);
        }
        for sub in subs {
            stream.push(
                FramedBuilder::new(frame % 256, sub)
                    .payload(Bytes::from(vec![0x47u8; 1316]))
                    .build()
                    .unwrap(),
            );
        }
    }

    stream
}

fn bench_resequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("resequence");

    for &window in &[1usize, 4, 14] {
        let stream = make_stream(64, 40, window);
        let bytes: usize = stream.iter().map(|d| d.len()).sum();
        group.throughput(Throughput::Bytes(bytes as u64));

        group.bench_with_input(BenchmarkId::new("window", window), &stream, |b, stream| {
            b.iter(|| {
                let config = ResequencerConfig::default();
                let mut engine = Engine::with_config(config, Vec::<Bytes>::new()).unwrap();
                engine.process_all(stream.iter().cloned()).unwrap();
                engine.finish().unwrap();
                criterion::black_box(engine.stats());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resequence);
criterion_main!(benches);
