use crate::commands::read_input;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use tsreseq_core::{analysis::analyze, capture::read_capture};
use tracing::info;

pub fn execute(input: &str, json: Option<&str>) -> Result<()> {
    info!("Inspecting capture: {}", input);

    let data = read_input(input)?;
    let datagrams = read_capture(data).context("Failed to parse capture")?;

    if datagrams.is_empty() {
        println!("{} Capture holds no datagrams", "✗".red());
        return Ok(());
    }

    let report = analyze(datagrams);

    println!("\n=== Capture Contents ===");
    println!("Datagrams:          {}", report.datagrams);
    println!("Passthrough:        {}", report.passthrough);
    println!("Framed:             {}", report.framed);
    if report.rejected > 0 {
        println!("Rejected:           {}", report.rejected.to_string().red());
    } else {
        println!("Rejected:           {}", report.rejected);
    }

    println!("\n=== Arrival Order ===");
    println!("Frames seen:        {}", report.frames_seen);
    println!("Late arrivals:      {}", report.late_arrivals);
    println!("Duplicates:         {}", report.duplicates);
    println!("Max displacement:   {}", report.max_displacement);
    println!(
        "Suggested capacity: {}",
        report.suggested_capacity().to_string().cyan()
    );

    if let (Some(min), Some(max)) = (report.turnovers.iter().min(), report.turnovers.iter().max())
    {
        println!("Turnover sub-index: {}..={}", min, max);
    }

    println!("\n=== Gaps ===");
    if report.gaps.is_empty() {
        println!("{} No missing sub-packets", "✓".green());
    } else {
        println!(
            "{} {} sub-packets missing across {} frames",
            "✗".red(),
            report.missing_total(),
            report.gaps.len()
        );
        for gap in &report.gaps {
            println!(
                "  frame {:>3}: missing {:?} (last sub {})",
                gap.frame_index, gap.missing, gap.last_sub
            );
        }
    }

    if let Some(path) = json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, out).with_context(|| format!("Failed to write report file: {}", path))?;
        info!("Wrote report to {}", path);
    }

    Ok(())
}
