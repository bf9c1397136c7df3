use crate::net::{open_socket, parse_group, DatagramSource};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use tsreseq_core::{capture::CaptureWriter, constants::MAX_DATAGRAM_SIZE};
use tracing::{info, warn};

pub fn execute(group: &str, port: u16, output: &str, count: Option<u64>) -> Result<()> {
    let group = parse_group(group)?;

    let file =
        File::create(output).with_context(|| format!("Failed to create output file: {}", output))?;
    let mut writer = CaptureWriter::new(file).context("Failed to write capture header")?;

    let mut socket = open_socket(group, port)?;
    let recorded = capture(&mut socket, &mut writer, count)?;

    writer.finish().context("Failed to flush capture")?;
    info!("Recorded {} datagrams to {}", recorded, output);

    Ok(())
}

/// Copy datagrams from `source` into a capture until `limit` have been written
pub fn capture<Src, W>(
    source: &mut Src,
    writer: &mut CaptureWriter<W>,
    limit: Option<u64>,
) -> Result<u64>
where
    Src: DatagramSource,
    W: Write,
{
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    while limit.map_or(true, |n| writer.records() < n) {
        let len = match source.recv_datagram(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Receive failed: {}", e);
                continue;
            }
        };

        writer
            .write_datagram(&buf[..len])
            .context("Failed to write capture record")?;
    }

    Ok(writer.records())
}
