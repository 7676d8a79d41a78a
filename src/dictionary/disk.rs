//! Streaming combine
//!
//! Concatenates several dumps into one file one record at a time, so no source
//! is ever held in memory as a whole.
//!
//! ## Flow
//! ```text
//!   source 0 ─┐
//!   source 1 ─┼─▶ read record ─▶ re-encode if compression differs ─▶ rekey ─▶ destination
//!   source N ─┘
//! ```
//!
//! On failure the destination is left half-written and must be discarded.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, trace};

use crate::config::CombineOptions;
use crate::error::{DictError, Result};
use crate::record::{FileRecordReader, FileRecordWriter};
use crate::transcode;

use super::CompressedDictionary;

/// Summary of a finished on-disk combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineStats {
    /// Source files read
    pub sources: usize,
    /// Key-value records written to the destination
    pub records: u64,
    /// Records whose payload had to change compression
    pub reencoded: u64,
}

impl CompressedDictionary {
    /// Combine dumped dictionaries into `destination` without loading them
    ///
    /// Output compression defaults to the first source's and can be overridden
    /// through `options`. With `reset_keys`, every record, the first source's
    /// included, is renumbered from 0 in source order; the in-memory
    /// [`combine`](CompressedDictionary::combine) only agrees when the first
    /// source is already keyed `0..n`. Without `reset_keys`, a key already
    /// written by an earlier record fails with `DuplicateKey`.
    pub fn combine_on_disk<P>(
        destination: impl AsRef<Path>,
        sources: &[P],
        options: &CombineOptions,
    ) -> Result<CombineStats>
    where
        P: AsRef<Path>,
    {
        let destination = destination.as_ref();
        let first = sources.first().ok_or_else(|| {
            DictError::Configuration("combine_on_disk requires at least one source".to_string())
        })?;

        for source in sources {
            if same_file(source.as_ref(), destination) {
                return Err(DictError::Configuration(format!(
                    "destination {} is also a source",
                    destination.display()
                )));
            }
        }

        let first = first.as_ref();
        let mut metadata = read_metadata(first)?;
        if let Some(compression) = options.compression {
            metadata = metadata.with_compression(compression);
        }
        let target = metadata.compression;

        let mut writer = FileRecordWriter::create(destination, None)
            .map_err(|e| e.with_path(destination))?;
        writer
            .write_metadata(&metadata)
            .map_err(|e| e.with_path(destination))?;

        let mut stats = CombineStats::default();
        let mut next_key: i64 = 0;
        let mut seen: HashSet<i64> = HashSet::new();

        for source in sources {
            let source = source.as_ref();
            let mut reader = FileRecordReader::open(source).map_err(|e| e.with_path(source))?;
            let source_compression = reader
                .read_metadata()
                .map_err(|e| e.with_path(source))?
                .compression;

            for entry in reader.key_values() {
                let (key, payload) = entry.map_err(|e| e.with_path(source))?;

                let payload = if source_compression != target {
                    stats.reencoded += 1;
                    transcode::reencode(&payload, source_compression, target).map_err(|e| {
                        DictError::Format {
                            path: Some(source.to_path_buf()),
                            message: format!("cannot re-encode value of key {}: {}", key, e),
                        }
                    })?
                } else {
                    payload
                };

                let out_key = if options.reset_keys {
                    let key = next_key;
                    next_key += 1;
                    key
                } else {
                    if !seen.insert(key) {
                        return Err(DictError::DuplicateKey {
                            key,
                            source_path: Some(source.to_path_buf()),
                        });
                    }
                    key
                };

                writer
                    .write_key_value(out_key, &payload)
                    .map_err(|e| e.with_path(destination))?;
                stats.records += 1;
                trace!(source = %source.display(), key, out_key, "copied record");
            }

            stats.sources += 1;
            debug!(
                source = %source.display(),
                compression = %source_compression,
                records = stats.records,
                "combined source"
            );
        }

        writer.close().map_err(|e| e.with_path(destination))?;

        debug!(
            destination = %destination.display(),
            compression = %target,
            sources = stats.sources,
            records = stats.records,
            reencoded = stats.reencoded,
            "combine on disk finished"
        );
        Ok(stats)
    }
}

/// Metadata of a dump, closing the file right after
fn read_metadata(path: &Path) -> Result<crate::record::Metadata> {
    let mut reader = FileRecordReader::open(path).map_err(|e| e.with_path(path))?;
    reader.read_metadata().map_err(|e| e.with_path(path))
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
