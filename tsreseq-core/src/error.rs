//! Error types for resequencing operations

/// Errors that can occur while classifying, resequencing or emitting datagrams
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReseqError {
    /// Datagram is too short to carry a framing header
    #[error("Short datagram: expected at least {expected} bytes, got {actual}")]
    ShortDatagram {
        /// The minimum number of bytes required.
        expected: usize,
        /// The number of bytes actually received.
        actual: usize,
    },

    /// Datagram exceeds the maximum UDP size
    #[error("Datagram size {0} exceeds maximum {1}")]
    DatagramTooLarge(usize, usize),

    /// IO error while writing to the sink or reading input
    #[error("IO error: {0}")]
    Io(String),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Capture file does not start with the expected magic
    #[error("Invalid capture magic: expected TSRQCAP1, got {0:?}")]
    BadCaptureMagic([u8; 8]),

    /// Capture record runs past the end of the file
    #[error("Truncated capture record at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedCapture {
        /// Byte offset of the record prefix.
        offset: usize,
        /// The number of bytes the record announced.
        expected: usize,
        /// The number of bytes left in the file.
        actual: usize,
    },
}

impl From<std::io::Error> for ReseqError {
    fn from(err: std::io::Error) -> Self {
        ReseqError::Io(err.to_string())
    }
}
