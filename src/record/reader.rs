//! Record Reader
//!
//! Parses length-prefixed records back out of a byte stream.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bytes::Bytes;

use crate::compression::{Compression, EnvelopeReader};
use crate::error::{open_error, DictError, Result};

use super::{Metadata, KEY_WIDTH, LENGTH_WIDTH};

/// Reads records from any byte stream
pub struct RecordReader<R: Read> {
    inner: R,
    records_read: u64,
}

/// Record reader over a file, with whole-file envelope handling
pub type FileRecordReader = RecordReader<EnvelopeReader<BufReader<File>>>;

impl FileRecordReader {
    /// Open a file, unwrapping a whole-file envelope if its magic bytes match
    pub fn open(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path).map_err(open_error(path))?);
        Ok(Self::new(EnvelopeReader::detect(file)?))
    }

    /// Open a file wrapped in a known envelope (`None` for a plain file)
    pub fn open_with_envelope(path: &Path, envelope: Option<Compression>) -> Result<Self> {
        let file = BufReader::new(File::open(path).map_err(open_error(path))?);
        Ok(Self::new(EnvelopeReader::with_envelope(file, envelope)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            records_read: 0,
        }
    }

    /// Read the next record
    ///
    /// Returns:
    /// - `Ok(Some(payload))`: a complete record
    /// - `Ok(None)`: clean end of stream
    /// - `Err(Format)`: the stream ends inside a record
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; LENGTH_WIDTH];
        let filled = read_up_to(&mut self.inner, &mut len_buf)?;

        if filled == 0 {
            return Ok(None);
        }
        if filled < LENGTH_WIDTH {
            return Err(DictError::format(format!(
                "truncated length prefix: got {} of {} bytes",
                filled, LENGTH_WIDTH
            )));
        }

        let len = u32::from_le_bytes(len_buf) as u64;

        // Grow as data arrives rather than trusting a possibly corrupt length
        let mut payload = Vec::new();
        let got = (&mut self.inner).take(len).read_to_end(&mut payload)? as u64;
        if got < len {
            return Err(DictError::format(format!(
                "truncated record {}: expected {} bytes, got {}",
                self.records_read, len, got
            )));
        }

        self.records_read += 1;
        Ok(Some(payload))
    }

    /// Read the next key-value record
    pub fn read_key_value(&mut self) -> Result<Option<(i64, Bytes)>> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };

        if record.len() < KEY_WIDTH {
            return Err(DictError::format(format!(
                "key-value record of {} bytes is shorter than its {}-byte key",
                record.len(),
                KEY_WIDTH
            )));
        }

        let mut key_buf = [0u8; KEY_WIDTH];
        key_buf.copy_from_slice(&record[..KEY_WIDTH]);
        let key = i64::from_le_bytes(key_buf);

        // Value shares the record allocation
        let value = Bytes::from(record).slice(KEY_WIDTH..);

        Ok(Some((key, value)))
    }

    /// Read the metadata record that opens every file
    pub fn read_metadata(&mut self) -> Result<Metadata> {
        match self.read_record()? {
            Some(payload) => Metadata::from_bytes(&payload),
            None => Err(DictError::format("missing metadata record")),
        }
    }

    /// Iterate over the remaining key-value records
    pub fn key_values(self) -> KeyValues<R> {
        KeyValues {
            reader: self,
            done: false,
        }
    }

    /// Number of complete records read so far (metadata included)
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

/// Iterator over key-value records
///
/// Stops after the first error.
pub struct KeyValues<R: Read> {
    reader: RecordReader<R>,
    done: bool,
}

impl<R: Read> Iterator for KeyValues<R> {
    type Item = Result<(i64, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_key_value() {
            Ok(Some(kv)) => Some(Ok(kv)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows, returning the number of bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
