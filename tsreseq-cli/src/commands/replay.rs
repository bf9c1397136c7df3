use crate::commands::{open_output, print_stats, read_input, write_stats_json};
use anyhow::{Context, Result};
use tsreseq_core::{capture::read_capture, Engine, ResequencerConfig, WriteSink};
use tracing::info;

pub fn execute(
    input: &str,
    output: Option<&str>,
    capacity: usize,
    stats_json: Option<&str>,
) -> Result<()> {
    info!("Replaying capture: {}", input);

    let data = read_input(input)?;
    let datagrams = read_capture(data).context("Failed to parse capture")?;
    info!("Loaded {} datagrams", datagrams.len());

    let config = ResequencerConfig::with_capacity(capacity);
    let sink = WriteSink::new(open_output(output)?);
    let mut engine =
        Engine::with_config(config, sink).context("Invalid resequencer configuration")?;

    engine
        .process_all(datagrams)
        .context("Failed to write output")?;
    engine.finish().context("Failed to write output")?;

    let stats = engine.stats();
    print_stats(&stats);

    if let Some(path) = stats_json {
        write_stats_json(&stats, path)?;
        info!("Wrote statistics to {}", path);
    }

    Ok(())
}
