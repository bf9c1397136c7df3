//! Datagram capture files
//!
//! A capture preserves datagram boundaries so a recorded session can be
//! replayed through the engine offline.
//!
//! Layout:
//! 1. Magic (8 bytes): "TSRQCAP1"
//! 2. Records, repeated until end of file:
//!    - Length (4 bytes, big-endian)
//!    - Datagram bytes

use crate::constants::{CAPTURE_MAGIC, CAPTURE_RECORD_PREFIX, MAX_DATAGRAM_SIZE};
use crate::error::ReseqError;
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Write;

/// Appends datagrams to a capture stream
#[derive(Debug)]
pub struct CaptureWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> CaptureWriter<W> {
    /// Write the magic and return a writer positioned for the first record
    pub fn new(mut inner: W) -> Result<Self, ReseqError> {
        inner.write_all(CAPTURE_MAGIC)?;
        Ok(Self { inner, records: 0 })
    }

    /// Append one datagram
    pub fn write_datagram(&mut self, datagram: &[u8]) -> Result<(), ReseqError> {
        if datagram.len() > MAX_DATAGRAM_SIZE {
            return Err(ReseqError::DatagramTooLarge(
                datagram.len(),
                MAX_DATAGRAM_SIZE,
            ));
        }

        self.inner.write_all(&(datagram.len() as u32).to_be_bytes())?;
        self.inner.write_all(datagram)?;
        self.records += 1;
        Ok(())
    }

    /// Number of datagrams written
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flush and recover the underlying writer
    pub fn finish(mut self) -> Result<W, ReseqError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Encode a whole capture in memory
pub fn encode_capture<'a, I>(datagrams: I) -> Result<Bytes, ReseqError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut buf = BytesMut::new();
    buf.put_slice(CAPTURE_MAGIC);

    for datagram in datagrams {
        if datagram.len() > MAX_DATAGRAM_SIZE {
            return Err(ReseqError::DatagramTooLarge(
                datagram.len(),
                MAX_DATAGRAM_SIZE,
            ));
        }
        buf.put_u32(datagram.len() as u32);
        buf.put_slice(datagram);
    }

    Ok(buf.freeze())
}

/// Parse a capture, slicing each datagram out of `data` without copying
pub fn read_capture(data: Bytes) -> Result<Vec<Bytes>, ReseqError> {
    if data.len() < CAPTURE_MAGIC.len() {
        let mut magic = [0u8; 8];
        magic[..data.len()].copy_from_slice(&data);
        return Err(ReseqError::BadCaptureMagic(magic));
    }

    if &data[..CAPTURE_MAGIC.len()] != CAPTURE_MAGIC {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&data[..CAPTURE_MAGIC.len()]);
        return Err(ReseqError::BadCaptureMagic(magic));
    }

    let mut records = Vec::new();
    let mut pos = CAPTURE_MAGIC.len();

    while pos < data.len() {
        let remaining = data.len() - pos;
        if remaining < CAPTURE_RECORD_PREFIX {
            return Err(ReseqError::TruncatedCapture {
                offset: pos,
                expected: CAPTURE_RECORD_PREFIX,
                actual: remaining,
            });
        }

        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        if len > MAX_DATAGRAM_SIZE {
            return Err(ReseqError::DatagramTooLarge(len, MAX_DATAGRAM_SIZE));
        }

        let start = pos + CAPTURE_RECORD_PREFIX;
        let available = data.len() - start;
        if available < len {
            return Err(ReseqError::TruncatedCapture {
                offset: pos,
                expected: len,
                actual: available,
            });
        }

        records.push(data.slice(start..start + len));
        pos = start + len;
    }

    Ok(records)
}
