//! Subcommand implementations

pub mod inspect;
pub mod receive;
pub mod record;
pub mod replay;

use anyhow::{Context, Result};
use bytes::Bytes;
use colored::*;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use tsreseq_core::ReseqStats;

/// Open the TS output: stdout for `None` or `-`, otherwise a new file
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        None | Some("-") => Ok(Box::new(io::stdout())),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Ok(Box::new(file))
        }
    }
}

/// Read a whole input file, or stdin for `-`
pub fn read_input(path: &str) -> Result<Bytes> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        Ok(Bytes::from(buf))
    } else {
        let data =
            fs::read(path).with_context(|| format!("Failed to read input file: {}", path))?;
        Ok(Bytes::from(data))
    }
}

/// Print engine counters to stderr (stdout may carry the stream)
pub fn print_stats(stats: &ReseqStats) {
    eprintln!("\n=== Resequencing Results ===");
    eprintln!("Datagrams:          {}", stats.datagrams);
    eprintln!("Passthrough:        {}", stats.passthrough);
    eprintln!("Framed:             {}", stats.framed);
    eprintln!("Rejected:           {}", stats.rejected);
    eprintln!("Emitted live:       {}", stats.emitted_live);
    eprintln!("Emitted buffered:   {}", stats.emitted_from_buffer);
    eprintln!("Reorder rate:       {:.2}%", stats.reorder_rate());
    eprintln!("Prebuffer skips:    {}", stats.prebuffer_skips);
    eprintln!("Bytes out:          {} bytes", stats.bytes_out);

    if stats.overflows > 0 {
        eprintln!(
            "{} {} buffer overflows, {} resyncs, {} packets dropped on a full buffer",
            "!".yellow(),
            stats.overflows,
            stats.resyncs,
            stats.full_drops
        );
    } else {
        eprintln!("{} No buffer overflows", "✓".green());
    }
}

/// Write counters as pretty JSON
pub fn write_stats_json(stats: &ReseqStats, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).context("Failed to serialize statistics")?;
    fs::write(path, json).with_context(|| format!("Failed to write statistics file: {}", path))
}
