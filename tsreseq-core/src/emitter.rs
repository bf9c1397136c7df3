//! Output emission
//!
//! The engine hands every chunk it wants written, in order, to a [`Sink`].
//! Sinks write verbatim and never reorder.

use crate::error::ReseqError;
use bytes::Bytes;
use std::io::Write;

/// Destination for ordered output
pub trait Sink {
    /// Write one chunk verbatim
    fn emit(&mut self, chunk: &[u8]) -> Result<(), ReseqError>;
}

/// Sink over any [`std::io::Write`], flushed after every chunk
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
    chunks: u64,
    bytes: u64,
}

impl<W: Write> WriteSink<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            chunks: 0,
            bytes: 0,
        }
    }

    /// Number of chunks written so far
    pub fn chunks_written(&self) -> u64 {
        self.chunks
    }

    /// Number of bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Borrow the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn emit(&mut self, chunk: &[u8]) -> Result<(), ReseqError> {
        self.inner.write_all(chunk)?;
        self.inner.flush()?;
        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        Ok(())
    }
}

/// Collects each chunk as a separate buffer
impl Sink for Vec<Bytes> {
    fn emit(&mut self, chunk: &[u8]) -> Result<(), ReseqError> {
        self.push(Bytes::copy_from_slice(chunk));
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, chunk: &[u8]) -> Result<(), ReseqError> {
        (**self).emit(chunk)
    }
}
