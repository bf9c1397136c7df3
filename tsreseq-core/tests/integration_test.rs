//! End-to-end tests for the classify → resequence → emit flow

use bytes::Bytes;
use tsreseq_core::{
    builder::FramedBuilder,
    capture::{encode_capture, read_capture},
    constants::DEFAULT_REORDER_CAPACITY,
    Cursor, Disposition, Engine, ResequencerConfig, Routed, WriteSink,
};

fn framed(frame: u16, sub: u16) -> Bytes {
    FramedBuilder::new(frame, sub)
        .payload(Bytes::from(format!("[{}/{}]", frame, sub)))
        .build()
        .unwrap()
}

fn label(frame: u16, sub: u16) -> String {
    format!("[{}/{}]", frame, sub)
}

fn labels(chunks: &[Bytes]) -> Vec<String> {
    chunks
        .iter()
        .map(|c| String::from_utf8_lossy(c).to_string())
        .collect()
}

#[test]
fn test_in_order_frame_emits_without_buffering() {
    let mut engine = Engine::new(Vec::<Bytes>::new());

    for sub in 0..4 {
        let routed = engine.process(framed(5, sub)).unwrap();
        assert_eq!(routed, Routed::Framed(Disposition::Emitted));
    }

    assert_eq!(
        labels(engine.sink()),
        (0..4).map(|s| label(5, s)).collect::<Vec<_>>()
    );
    assert_eq!(engine.stats().buffered, 0);
}

#[test]
fn test_swapped_arrivals_emit_in_order() {
    let mut engine = Engine::new(Vec::<Bytes>::new());

    engine
        .process_all([0, 2, 1, 3].iter().map(|&s| framed(5, s)))
        .unwrap();

    assert_eq!(
        labels(engine.sink()),
        vec![label(5, 0), label(5, 1), label(5, 2), label(5, 3)]
    );
}

#[test]
fn test_overflow_fires_once_then_resyncs() {
    let capacity = DEFAULT_REORDER_CAPACITY as u16;
    let mut engine = Engine::new(Vec::<Bytes>::new());

    engine.process(framed(5, 0)).unwrap();

    // Sub 1 is lost; capacity + 2 later sub-packets arrive
    let mut routes = Vec::new();
    for sub in 2..(capacity + 4) {
        routes.push(engine.process(framed(5, sub)).unwrap());
    }

    let overflows = routes
        .iter()
        .filter(|r| **r == Routed::Framed(Disposition::Overflow))
        .count();
    assert_eq!(overflows, 1);

    let stats = engine.stats();
    assert_eq!(stats.overflows, 1);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(engine.resequencer().buffered(), 0);

    let emitted = labels(engine.sink());
    assert!(!emitted.contains(&label(5, 1)));
    assert_eq!(emitted.len(), capacity as usize + 3);
    assert_eq!(emitted.last(), Some(&label(5, capacity + 3)));
}

/// Shared in-memory log sink for a fmt subscriber
#[cfg(feature = "logging")]
#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(feature = "logging")]
impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(feature = "logging")]
impl std::io::Write for LogBuffer {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "logging")]
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(feature = "logging")]
#[test]
fn test_overflow_logs_one_warning() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();

    let capacity = DEFAULT_REORDER_CAPACITY as u16;
    tracing::subscriber::with_default(subscriber, || {
        let mut engine = Engine::new(Vec::<Bytes>::new());
        engine.process(framed(5, 0)).unwrap();
        for sub in 2..(capacity + 4) {
            engine.process(framed(5, sub)).unwrap();
        }
        assert_eq!(engine.stats().resyncs, 1);
    });

    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "unexpected log output: {:?}", lines);
    assert!(lines[0].contains("WARN"));
    assert!(lines[0].contains("Reorder buffer full (15 slots)"));
    // Counters of the packet that filled the buffer, then the cursor
    assert!(lines[0].contains(&format!("at (5, {})", capacity + 1)));
    assert!(lines[0].contains("waiting for (5, 1)"));
}

#[test]
fn test_passthrough_interleaves_at_arrival_point() {
    let mut engine = Engine::new(WriteSink::new(Vec::new()));
    let ts = Bytes::from(vec![0x47u8; 188 * 3]);

    engine.process(framed(8, 0)).unwrap();
    engine.process(framed(8, 2)).unwrap();
    let cursor = engine.resequencer().cursor();
    engine.process(ts.clone()).unwrap();
    assert_eq!(engine.resequencer().cursor(), cursor);
    assert_eq!(engine.resequencer().buffered(), 1);
    engine.process(framed(8, 1)).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(label(8, 0).as_bytes());
    expected.extend_from_slice(&ts);
    expected.extend_from_slice(label(8, 1).as_bytes());
    expected.extend_from_slice(label(8, 2).as_bytes());

    assert_eq!(engine.into_sink().into_inner(), expected);
}

#[test]
fn test_in_order_frames_survive_prebuffering() {
    let mut engine = Engine::new(Vec::<Bytes>::new());
    let keys: Vec<(u16, u16)> = [254u16, 255, 0]
        .iter()
        .flat_map(|&f| (0..20).map(move |s| (f, s)))
        .collect();

    engine
        .process_all(keys.iter().map(|&(f, s)| framed(f, s)))
        .unwrap();
    engine.finish().unwrap();

    let expected: Vec<String> = keys.iter().map(|&(f, s)| label(f, s)).collect();
    assert_eq!(labels(engine.sink()), expected);

    let stats = engine.stats();
    assert_eq!(stats.prebuffer_completions, 2);
    assert_eq!(stats.prebuffer_skips, 2);
    assert_eq!(stats.overflows, 0);
    assert_eq!(engine.resequencer().cursor(), Some(Cursor::new(0, 20)));
}

#[test]
fn test_turnover_bridges_reordered_boundary() {
    let mut engine = Engine::new(Vec::<Bytes>::new());

    // Frame 10 ends at sub 4; sub 3 is overtaken by the start of frame 11
    let arrivals = [(10, 0), (10, 1), (10, 2), (10, 4), (11, 0), (11, 1), (10, 3), (11, 2)];
    engine
        .process_all(arrivals.iter().map(|&(f, s)| framed(f, s)))
        .unwrap();

    let expected: Vec<String> = [(10, 0), (10, 1), (10, 2), (10, 3), (10, 4), (11, 0), (11, 1), (11, 2)]
        .iter()
        .map(|&(f, s)| label(f, s))
        .collect();
    assert_eq!(labels(engine.sink()), expected);
    assert_eq!(engine.resequencer().turnover(), None);
}

#[test]
fn test_small_capacity_config() {
    let config = ResequencerConfig::with_capacity(3);
    let mut engine = Engine::with_config(config, Vec::<Bytes>::new()).unwrap();

    engine.process(framed(1, 0)).unwrap();
    engine.process(framed(1, 3)).unwrap();
    engine.process(framed(1, 2)).unwrap();
    let routed = engine.process(framed(1, 4)).unwrap();

    assert_eq!(routed, Routed::Framed(Disposition::Overflow));
    // Skip-ahead to sub 2 releases everything parked
    assert_eq!(
        labels(engine.sink()),
        vec![label(1, 0), label(1, 2), label(1, 3), label(1, 4)]
    );
}

#[test]
fn test_replay_from_capture() {
    let datagrams = vec![
        framed(3, 0),
        framed(3, 2),
        Bytes::from(vec![0x47u8; 188]),
        framed(3, 1),
        Bytes::from_static(b"runt"),
        framed(3, 3),
    ];
    let capture = encode_capture(datagrams.iter().map(|d| d.as_ref())).unwrap();
    let records = read_capture(capture).unwrap();
    assert_eq!(records, datagrams);

    let mut engine = Engine::new(Vec::<Bytes>::new());
    engine.process_all(records).unwrap();

    let stats = engine.stats();
    assert_eq!(stats.datagrams, 6);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.passthrough, 1);
    assert_eq!(stats.emitted(), 4);
    assert_eq!(engine.sink().len(), 5);
}
