//! Dump and load
//!
//! Moves a dictionary to and from its on-disk record stream without ever
//! decompressing a value.

use std::path::Path;

use tracing::debug;

use crate::config::{DumpOptions, LoadOptions};
use crate::error::Result;
use crate::record::{FileRecordReader, FileRecordWriter};

use super::CompressedDictionary;

impl CompressedDictionary {
    /// Write the whole dictionary to `path`
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        self.dump_with(path, &DumpOptions::default())
    }

    /// Write the dictionary to `path`
    ///
    /// The metadata record comes first, then one key-value record per entry in
    /// insertion order. The file is truncated if it exists.
    pub fn dump_with(&self, path: impl AsRef<Path>, options: &DumpOptions) -> Result<()> {
        let path = path.as_ref();
        self.write_file(path, options)
            .map_err(|e| e.with_path(path))
    }

    fn write_file(&self, path: &Path, options: &DumpOptions) -> Result<()> {
        let envelope = options.envelope.then_some(self.compression);
        let mut writer = FileRecordWriter::create(path, envelope)?;

        writer.write_metadata(&self.metadata())?;

        let limit = options.limit.unwrap_or(usize::MAX);
        for (key, payload) in self.raw_entries().take(limit) {
            writer.write_key_value(key, payload)?;
        }

        let records = writer.records_written();
        let bytes = writer.bytes_written();
        writer.close()?;

        debug!(
            path = %path.display(),
            compression = %self.compression,
            entries = records - 1,
            bytes,
            envelope = options.envelope,
            "dumped dictionary"
        );
        Ok(())
    }

    /// Read a dictionary back from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    /// Read a dictionary back from `path`
    ///
    /// Compression comes from the file's metadata record. With a `limit`, only
    /// the first entries are read and the rest of the file is ignored.
    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        Self::read_file(path, options).map_err(|e| e.with_path(path))
    }

    fn read_file(path: &Path, options: &LoadOptions) -> Result<Self> {
        let mut reader = match options.envelope {
            Some(envelope) => FileRecordReader::open_with_envelope(path, Some(envelope))?,
            None => FileRecordReader::open(path)?,
        };

        let metadata = reader.read_metadata()?;
        let mut dict = Self::new(metadata.compression);

        let limit = options.limit.unwrap_or(usize::MAX);
        for entry in reader.key_values().take(limit) {
            let (key, payload) = entry?;
            dict.insert_raw(key, payload);
        }

        debug!(
            path = %path.display(),
            compression = %dict.compression,
            entries = dict.len(),
            "loaded dictionary"
        );
        Ok(dict)
    }
}
