//! Metadata record
//!
//! First record of every file. Describes how the key-value records that
//! follow were compressed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compression::Compression;
use crate::error::{DictError, Result};

/// Parsed metadata record
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Compression of every value payload in the file
    pub compression: Compression,

    /// Attributes written by other producers, carried through untouched
    pub extra: Map<String, Value>,
}

/// Wire shape of the metadata record
#[derive(Serialize, Deserialize)]
struct RawMetadata {
    compression: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            extra: Map::new(),
        }
    }

    /// Same attributes, different value compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Serialize to the record payload
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let raw = RawMetadata {
            compression: self.compression.name().to_string(),
            extra: self.extra.clone(),
        };
        Ok(serde_json::to_vec(&raw)?)
    }

    /// Parse a record payload
    ///
    /// An unknown compression identifier is a configuration problem, not a
    /// malformed file.
    pub fn from_bytes(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| DictError::format(format!("metadata is not valid UTF-8: {}", e)))?;
        let raw: RawMetadata = serde_json::from_str(text)?;

        Ok(Self {
            compression: raw.compression.parse()?,
            extra: raw.extra,
        })
    }
}
