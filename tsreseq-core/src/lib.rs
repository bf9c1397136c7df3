//! # tsreseq Core
//!
//! Resequencing engine for the framed transport-stream feed an action camera
//! broadcasts over UDP.
//!
//! ## Modules
//!
//! - `constants`: Header layout, sizes and defaults
//! - `types`: Core types (FramedPacket, Classified, Cursor, ResequencerConfig)
//! - `classifier`: Passthrough/framed classification
//! - `builder`: Framed datagram encoding
//! - `reorder`: Fixed-capacity reorder buffer
//! - `resequencer`: Cursor, turnover, prebuffer and resync state machine
//! - `emitter`: Output sinks
//! - `engine`: Classify-route-drain glue for one stream
//! - `stats`: Engine counters
//! - `capture`: Datagram capture file format
//! - `analysis`: Arrival-order analysis of recorded streams

#![warn(missing_docs)]

pub mod analysis;
pub mod builder;
pub mod capture;
pub mod classifier;
pub mod constants;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod reorder;
pub mod resequencer;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use emitter::{Sink, WriteSink};
pub use engine::{Engine, Routed};
pub use error::ReseqError;
pub use resequencer::{Disposition, ReseqState, Resequencer};
pub use stats::ReseqStats;
pub use types::{Classified, Cursor, FramedPacket, ResequencerConfig};

/// Result type alias for resequencing operations
pub type Result<T> = core::result::Result<T, ReseqError>;
