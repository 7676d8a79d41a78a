//! Record Writer
//!
//! Appends length-prefixed records to a byte stream.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::compression::{Compression, EnvelopeWriter};
use crate::error::{open_error, DictError, Result};

use super::{Metadata, LENGTH_WIDTH};

/// Writes records to any byte sink
pub struct RecordWriter<W: Write> {
    inner: W,
    records_written: u64,
    bytes_written: u64,
}

/// Record writer over a file, optionally inside a whole-file envelope
pub type FileRecordWriter = RecordWriter<EnvelopeWriter<BufWriter<File>>>;

impl FileRecordWriter {
    /// Create (or truncate) a file for writing
    pub fn create(path: &Path, envelope: Option<Compression>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(open_error(path))?;

        Ok(Self::new(EnvelopeWriter::new(BufWriter::new(file), envelope)))
    }

    /// Terminate the envelope, flush buffers and sync the file to disk
    pub fn close(self) -> Result<()> {
        let buffered = self.inner.finish()?;
        let file = buffered
            .into_inner()
            .map_err(|e| DictError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Write one record: length prefix, then exactly `payload`
    pub fn write_record(&mut self, payload: &[u8]) -> Result<()> {
        self.write_parts(&[payload])
    }

    /// Write a key-value record: packed key immediately followed by `value`
    pub fn write_key_value(&mut self, key: i64, value: &[u8]) -> Result<()> {
        let key_bytes = key.to_le_bytes();
        self.write_parts(&[&key_bytes[..], value])
    }

    /// Write the metadata record
    ///
    /// As the first record of a plain file, its length prefix must not read as
    /// an envelope's magic bytes, or readers would try to unwrap the file.
    /// Trailing JSON whitespace is appended until it does not.
    pub fn write_metadata(&mut self, metadata: &Metadata) -> Result<()> {
        let mut payload = metadata.to_bytes()?;
        while looks_enveloped(&payload) {
            payload.push(b' ');
        }
        self.write_record(&payload)
    }

    /// Write a single record assembled from `parts` without concatenating them
    fn write_parts(&mut self, parts: &[&[u8]]) -> Result<()> {
        let total: usize = parts.iter().map(|p| p.len()).sum();
        let len = u32::try_from(total).map_err(|_| {
            DictError::format(format!(
                "record of {} bytes exceeds the {}-byte length prefix",
                total, LENGTH_WIDTH
            ))
        })?;

        self.inner.write_all(&len.to_le_bytes())?;
        for part in parts {
            self.inner.write_all(part)?;
        }

        self.records_written += 1;
        self.bytes_written += (LENGTH_WIDTH + total) as u64;
        Ok(())
    }

    /// Number of records written so far (metadata included)
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of bytes written so far, before any envelope compression
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and hand back the inner sink
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Whether a record holding `payload` would open with envelope magic bytes
fn looks_enveloped(payload: &[u8]) -> bool {
    let Ok(len) = u32::try_from(payload.len()) else {
        return false;
    };
    let mut head = len.to_le_bytes().to_vec();
    head.extend(payload.iter().take(MAGIC_PROBE_WIDTH - LENGTH_WIDTH));
    Compression::detect(&head).is_some()
}

/// Longest envelope magic, in bytes
const MAGIC_PROBE_WIDTH: usize = 6;
