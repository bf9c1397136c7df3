//! Fuzzing entry points for tsreseq-core
//!
//! Each function takes raw fuzzer input and must never panic. To drive them
//! with cargo-fuzz, install it (cargo install cargo-fuzz), run cargo fuzz init
//! and call one entry point per fuzz_target! body.

use bytes::Bytes;
use tsreseq_core::{capture::read_capture, classifier::classify_slice, Engine, ResequencerConfig};

pub fn fuzz_classify(data: &[u8]) {
    // Should never panic
    let _ = classify_slice(data);
}

/// Drive an engine with datagrams carved out of `data`
///
/// The first byte picks the buffer capacity; after that each datagram is a
/// one-byte length followed by that many bytes.
pub fn fuzz_engine(data: &[u8]) {
    let Some((&first, mut rest)) = data.split_first() else {
        return;
    };

    let config = ResequencerConfig::with_capacity(usize::from(first % 16) + 1);
    let Ok(mut engine) = Engine::with_config(config, Vec::<Bytes>::new()) else {
        return;
    };

    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len).min(tail.len());
        let _ = engine.process(Bytes::copy_from_slice(&tail[..len]));
        rest = &tail[len..];
    }

    let _ = engine.finish();
    assert!(engine.resequencer().buffered() <= config.capacity);
}

pub fn fuzz_capture(data: &[u8]) {
    // Should never panic
    let _ = read_capture(Bytes::copy_from_slice(data));
}
