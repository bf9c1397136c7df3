use crate::commands::{open_output, print_stats};
use crate::net::{open_socket, parse_group, DatagramSource};
use anyhow::{Context, Result};
use bytes::Bytes;
use tsreseq_core::{constants::MAX_DATAGRAM_SIZE, Engine, ResequencerConfig, Sink, WriteSink};
use tracing::{info, warn};

pub fn execute(
    group: &str,
    port: u16,
    output: Option<&str>,
    capacity: usize,
    count: Option<u64>,
    show_stats: bool,
) -> Result<()> {
    let group = parse_group(group)?;
    let config = ResequencerConfig::with_capacity(capacity);

    let sink = WriteSink::new(open_output(output)?);
    let mut engine =
        Engine::with_config(config, sink).context("Invalid resequencer configuration")?;

    let mut socket = open_socket(group, port)?;
    let received = pump(&mut socket, &mut engine, count)?;

    engine.finish().context("Failed to write output")?;
    info!("Stopped after {} datagrams", received);

    if show_stats {
        print_stats(&engine.stats());
    }

    Ok(())
}

/// Feed datagrams from `source` into `engine` until `limit` have arrived
///
/// A failed receive is logged and skipped. Without a limit this only
/// returns on an output error.
pub fn pump<Src, S>(source: &mut Src, engine: &mut Engine<S>, limit: Option<u64>) -> Result<u64>
where
    Src: DatagramSource,
    S: Sink,
{
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut received = 0u64;

    while limit.map_or(true, |n| received < n) {
        let len = match source.recv_datagram(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Receive failed: {}", e);
                continue;
            }
        };
        received += 1;

        engine
            .process(Bytes::copy_from_slice(&buf[..len]))
            .context("Failed to write output")?;
    }

    Ok(received)
}
