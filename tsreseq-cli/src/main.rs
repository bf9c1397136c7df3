use anyhow::Result;
use clap::{Parser, Subcommand};
use tsreseq_cli::commands;
use tsreseq_core::constants::DEFAULT_REORDER_CAPACITY;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tsreseq")]
#[command(about = "tsreseq - Resequence an action camera's UDP transport stream", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive a live stream and write resequenced TS
    Receive {
        /// Multicast group (or unicast address) to listen on
        group: String,

        /// UDP port
        port: u16,

        /// Output file for the transport stream (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Reorder buffer capacity
        #[arg(long, default_value_t = DEFAULT_REORDER_CAPACITY)]
        capacity: usize,

        /// Stop after this many datagrams
        #[arg(long)]
        count: Option<u64>,

        /// Print statistics on exit
        #[arg(long)]
        stats: bool,
    },

    /// Record raw datagrams to a capture file
    Record {
        /// Multicast group (or unicast address) to listen on
        group: String,

        /// UDP port
        port: u16,

        /// Capture file to write
        #[arg(short, long)]
        output: String,

        /// Stop after this many datagrams
        #[arg(long)]
        count: Option<u64>,
    },

    /// Resequence a capture file offline
    Replay {
        /// Capture file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output file for the transport stream (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Reorder buffer capacity
        #[arg(long, default_value_t = DEFAULT_REORDER_CAPACITY)]
        capacity: usize,

        /// Write statistics as JSON
        #[arg(long)]
        stats_json: Option<String>,
    },

    /// Report arrival order, gaps and turnovers in a capture
    Inspect {
        /// Capture file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Write the report as JSON
        #[arg(long)]
        json: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout may carry the stream
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Receive {
            group,
            port,
            output,
            capacity,
            count,
            stats,
        } => commands::receive::execute(&group, port, output.as_deref(), capacity, count, stats),

        Commands::Record {
            group,
            port,
            output,
            count,
        } => commands::record::execute(&group, port, &output, count),

        Commands::Replay {
            input,
            output,
            capacity,
            stats_json,
        } => commands::replay::execute(&input, output.as_deref(), capacity, stats_json.as_deref()),

        Commands::Inspect { input, json } => commands::inspect::execute(&input, json.as_deref()),
    }
}
