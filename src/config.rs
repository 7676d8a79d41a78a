//! Configuration for compressed-dictionary
//!
//! Option structs for the operations that take more than a couple of knobs,
//! each with sensible defaults and a builder.

use crate::compression::Compression;
use crate::error::{DictError, Result};

/// Compression used when none is specified
pub const DEFAULT_COMPRESSION: Compression = Compression::Bz2;

// =============================================================================
// Split
// =============================================================================

/// How to partition a dictionary
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Number of parts to produce (exclusive with `parts_length`)
    pub parts: Option<usize>,

    /// Target number of entries per part (exclusive with `parts`)
    pub parts_length: Option<usize>,

    /// Drop the trailing part when it is smaller than the first one
    pub drop_last: bool,

    /// Renumber each part's keys from 0
    pub reset_keys: bool,

    /// Randomize which keys land in which part
    pub shuffle: bool,

    /// Seed for the shuffle; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl SplitOptions {
    pub fn builder() -> SplitOptionsBuilder {
        SplitOptionsBuilder::default()
    }

    /// Number of parts for a dictionary of `len` entries
    ///
    /// Exactly one of `parts` / `parts_length` must be set, and to a
    /// non-zero value.
    pub fn resolve_parts(&self, len: usize) -> Result<usize> {
        match (self.parts, self.parts_length) {
            (Some(_), Some(_)) | (None, None) => Err(DictError::Configuration(
                "exactly one of `parts` and `parts_length` must be set".to_string(),
            )),
            (Some(0), None) => Err(DictError::Configuration(
                "`parts` must be at least 1".to_string(),
            )),
            (None, Some(0)) => Err(DictError::Configuration(
                "`parts_length` must be at least 1".to_string(),
            )),
            (Some(parts), None) => Ok(parts),
            (None, Some(length)) => Ok(len.div_ceil(length)),
        }
    }
}

/// Builder for SplitOptions
#[derive(Default)]
pub struct SplitOptionsBuilder {
    options: SplitOptions,
}

impl SplitOptionsBuilder {
    /// Split into this many parts
    pub fn parts(mut self, parts: usize) -> Self {
        self.options.parts = Some(parts);
        self
    }

    /// Split into parts of this many entries
    pub fn parts_length(mut self, length: usize) -> Self {
        self.options.parts_length = Some(length);
        self
    }

    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.options.drop_last = drop_last;
        self
    }

    pub fn reset_keys(mut self, reset_keys: bool) -> Self {
        self.options.reset_keys = reset_keys;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.options.shuffle = shuffle;
        self
    }

    /// Make the shuffle reproducible
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn build(self) -> SplitOptions {
        self.options
    }
}

// =============================================================================
// Dump / Load
// =============================================================================

/// Options for writing a dictionary to disk
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Write at most this many entries (in insertion order)
    pub limit: Option<usize>,

    /// Wrap the whole file in the dictionary's own compression
    pub envelope: bool,
}

impl DumpOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn envelope(mut self, envelope: bool) -> Self {
        self.envelope = envelope;
        self
    }
}

/// Options for reading a dictionary from disk
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Read at most this many entries; the rest of the file is ignored
    pub limit: Option<usize>,

    /// Whole-file envelope to strip; `None` sniffs the magic bytes
    pub envelope: Option<Compression>,
}

impl LoadOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn envelope(mut self, envelope: Compression) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

// =============================================================================
// Combine on disk
// =============================================================================

/// Options for streaming several dumps into one file
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// Output value compression; defaults to the first source's
    pub compression: Option<Compression>,

    /// Renumber every entry sequentially from 0
    pub reset_keys: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            compression: None,
            reset_keys: true,
        }
    }
}

impl CombineOptions {
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn reset_keys(mut self, reset_keys: bool) -> Self {
        self.reset_keys = reset_keys;
        self
    }
}
