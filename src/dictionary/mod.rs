//! Compressed Dictionary
//!
//! An associative container from integer keys to compressed JSON values.
//!
//! ## Responsibilities
//! - Compress values on the way in, decompress on the way out
//! - Remember insertion order for dumps and structural operations
//! - Hand raw payloads to the structural operations without touching them
//!
//! ## Storage
//! ```text
//!   content: key ─▶ (seq, payload)      order: seq ─▶ key
//!            ┌────┬──────────────┐             ┌─────┬─────┐
//!            │ 7  │ (0, BZh91..) │             │  0  │  7  │
//!            │ 3  │ (1, BZh91..) │             │  1  │  3  │
//!            └────┴──────────────┘             └─────┴─────┘
//! ```
//! `seq` is assigned on first insertion, so overwriting a key keeps its
//! position and removal is `O(log n)`.
//!
//! Payloads are [`Bytes`], so copying an entry into another dictionary shares
//! the compressed buffer instead of duplicating it.

mod disk;
mod merge;
mod persist;
mod split;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::compression::Compression;
use crate::error::{DictError, Result};
use crate::mapping::Mapping;
use crate::record::Metadata;
use crate::transcode;

pub use disk::CombineStats;
pub use split::Splits;

/// One stored entry
#[derive(Clone)]
struct Slot {
    /// Insertion sequence number
    seq: u64,
    /// Compressed JSON text
    payload: Bytes,
}

/// Dictionary whose values are kept compressed in memory
///
/// Not internally synchronized: share it across threads behind a lock, or give
/// each thread its own instance.
#[derive(Clone)]
pub struct CompressedDictionary {
    compression: Compression,
    content: HashMap<i64, Slot>,
    order: BTreeMap<u64, i64>,
    next_seq: u64,
}

impl CompressedDictionary {
    /// Create an empty dictionary
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            content: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Create an empty dictionary from an algorithm identifier (`bz2`, `gzip`, `xz`)
    pub fn with_compression_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Build a compressed copy of any other mapping
    pub fn from_mapping<M: Mapping + ?Sized>(source: &M, compression: Compression) -> Result<Self> {
        let mut dict = Self::new(compression);
        crate::mapping::copy_entries(source, &mut dict)?;
        Ok(dict)
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Metadata record describing this dictionary
    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.compression)
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Decompress and parse the value under `key`
    pub fn get(&self, key: i64) -> Result<Value> {
        transcode::decode(self.payload(key)?, self.compression)
    }

    /// Decompress the value under `key` straight into `T`
    pub fn get_deserialize<T: DeserializeOwned>(&self, key: i64) -> Result<T> {
        transcode::decode_deserialize(self.payload(key)?, self.compression)
    }

    /// Compress and store `value`, replacing any previous value
    pub fn insert(&mut self, key: i64, value: &Value) -> Result<()> {
        let payload = transcode::encode(value, self.compression)?;
        self.insert_raw(key, payload);
        Ok(())
    }

    /// Compress and store any serializable value
    pub fn insert_serialize<T: Serialize + ?Sized>(&mut self, key: i64, value: &T) -> Result<()> {
        let payload = transcode::encode_serialize(value, self.compression)?;
        self.insert_raw(key, payload);
        Ok(())
    }

    /// Remove `key` and its payload
    pub fn remove(&mut self, key: i64) -> Result<()> {
        let slot = self
            .content
            .remove(&key)
            .ok_or(DictError::KeyNotFound { key })?;
        self.order.remove(&slot.seq);
        Ok(())
    }

    /// Insert every pair, stopping at the first value that fails to encode
    pub fn extend_values<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (i64, Value)>,
    {
        for (key, value) in items {
            self.insert(key, &value)?;
        }
        Ok(())
    }

    /// Compress `items` on up to `threads` threads, then insert them in order
    ///
    /// Nothing is inserted if any value fails to encode.
    pub fn extend_parallel<I>(&mut self, items: I, threads: usize) -> Result<()>
    where
        I: IntoIterator<Item = (i64, Value)>,
    {
        let items: Vec<(i64, Value)> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(());
        }

        let threads = threads.clamp(1, items.len());
        let chunk_size = items.len().div_ceil(threads);
        let compression = self.compression;

        let encoded: Vec<Result<Vec<(i64, Bytes)>>> = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = items
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move |_| {
                        chunk
                            .iter()
                            .map(|(key, value)| Ok((*key, transcode::encode(value, compression)?)))
                            .collect::<Result<Vec<_>>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect()
        })
        .unwrap_or_else(|p| std::panic::resume_unwind(p));

        let encoded = encoded.into_iter().collect::<Result<Vec<_>>>()?;
        for (key, payload) in encoded.into_iter().flatten() {
            self.insert_raw(key, payload);
        }

        debug!(entries = self.len(), threads, "parallel insert finished");
        Ok(())
    }

    // =========================================================================
    // Raw access (structural operations only)
    // =========================================================================

    /// Store an already-compressed payload
    ///
    /// Bypasses the transcoder: `payload` must have been produced under this
    /// dictionary's compression.
    pub(crate) fn insert_raw(&mut self, key: i64, payload: Bytes) {
        match self.content.get_mut(&key) {
            Some(slot) => slot.payload = payload,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, key);
                self.content.insert(key, Slot { seq, payload });
            }
        }
    }

    /// Compressed payload under `key`, untouched
    pub(crate) fn get_raw(&self, key: i64) -> Option<&Bytes> {
        self.content.get(&key).map(|slot| &slot.payload)
    }

    /// `(key, payload)` pairs in insertion order
    pub(crate) fn raw_entries(&self) -> impl Iterator<Item = (i64, &Bytes)> + '_ {
        self.order
            .values()
            .map(move |key| (*key, &self.content[key].payload))
    }

    fn payload(&self, key: i64) -> Result<&Bytes> {
        self.get_raw(key).ok_or(DictError::KeyNotFound { key })
    }

    // =========================================================================
    // Container plumbing
    // =========================================================================

    pub fn contains_key(&self, key: i64) -> bool {
        self.content.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.order.clear();
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.order.values().copied()
    }

    /// Decoded values in insertion order
    pub fn values(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        self.raw_entries()
            .map(move |(_, payload)| transcode::decode(payload, self.compression))
    }

    /// Decoded `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (i64, Result<Value>)> + '_ {
        self.raw_entries()
            .map(move |(key, payload)| (key, transcode::decode(payload, self.compression)))
    }

    /// Largest key currently stored
    pub fn max_key(&self) -> Option<i64> {
        self.content.keys().copied().max()
    }

    /// Whether `other` stores values with the same compression
    pub fn compatible(&self, other: &Self) -> bool {
        self.compression == other.compression
    }

    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.compatible(other) {
            Ok(())
        } else {
            Err(DictError::Incompatible {
                left: self.compression,
                right: other.compression,
            })
        }
    }

    // =========================================================================
    // Footprint
    // =========================================================================

    /// Approximate bytes held by compressed values, buffer headers included
    pub fn values_size(&self) -> usize {
        let header = std::mem::size_of::<Bytes>();
        self.content
            .values()
            .map(|slot| header + slot.payload.len())
            .sum()
    }

    /// Approximate bytes held by keys and their bookkeeping
    pub fn keys_size(&self) -> usize {
        let per_key = std::mem::size_of::<i64>() * 2 + std::mem::size_of::<u64>() * 2;
        self.len() * per_key
    }
}

impl Default for CompressedDictionary {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COMPRESSION)
    }
}

impl fmt::Debug for CompressedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedDictionary")
            .field("compression", &self.compression)
            .field("len", &self.len())
            .field("values_size", &self.values_size())
            .finish()
    }
}

/// Equal when compression matches and every key decodes to the same value
///
/// Raw bytes and insertion order are irrelevant; a payload that fails to
/// decode makes the dictionaries unequal.
impl PartialEq for CompressedDictionary {
    fn eq(&self, other: &Self) -> bool {
        if self.compression != other.compression || self.len() != other.len() {
            return false;
        }

        self.raw_entries().all(|(key, payload)| {
            let Some(theirs) = other.get_raw(key) else {
                return false;
            };
            if payload == theirs {
                return true;
            }
            match (
                transcode::decode(payload, self.compression),
                transcode::decode(theirs, other.compression),
            ) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        })
    }
}

impl Mapping for CompressedDictionary {
    fn get(&self, key: i64) -> Result<Value> {
        CompressedDictionary::get(self, key)
    }

    fn insert(&mut self, key: i64, value: Value) -> Result<()> {
        CompressedDictionary::insert(self, key, &value)
    }

    fn remove(&mut self, key: i64) -> Result<()> {
        CompressedDictionary::remove(self, key)
    }

    fn contains_key(&self, key: i64) -> bool {
        CompressedDictionary::contains_key(self, key)
    }

    fn keys(&self) -> Vec<i64> {
        CompressedDictionary::keys(self).collect()
    }

    fn len(&self) -> usize {
        CompressedDictionary::len(self)
    }
}
