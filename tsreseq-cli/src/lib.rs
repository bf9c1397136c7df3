//! Library entry for tsreseq-cli used by integration tests and embedding.

pub mod commands;
pub mod net;

// Re-export commands for convenience
pub use commands::*;
pub use net::DatagramSource;
