//! Compression Module
//!
//! Closed set of general-purpose compressors a dictionary can store its
//! values with.
//!
//! ## Algorithms
//! - `bz2`: bzip2 (default)
//! - `gzip`: gzip / deflate
//! - `xz`: xz / LZMA2
//!
//! Each identifier is bound at compile time to its compress/decompress pair,
//! so adding an algorithm means adding a variant and handling it in every
//! `match` below.

mod envelope;

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::{DictError, Result};

pub use envelope::{EnvelopeReader, EnvelopeWriter};

/// Compression level used for bzip2 and gzip payloads
const BEST_LEVEL: u32 = 9;

/// Preset used for xz payloads
const XZ_PRESET: u32 = 6;

/// Compression algorithm identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    #[default]
    Bz2,
    Gzip,
    Xz,
}

impl Compression {
    /// Every supported algorithm
    pub const ALL: [Compression; 3] = [Compression::Bz2, Compression::Gzip, Compression::Xz];

    /// Short identifier as written in file metadata
    pub fn name(self) -> &'static str {
        match self {
            Compression::Bz2 => "bz2",
            Compression::Gzip => "gzip",
            Compression::Xz => "xz",
        }
    }

    /// Compress a byte buffer into a fresh, self-contained stream
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        let compressed = match self {
            Compression::Bz2 => {
                let mut enc = bzip2::write::BzEncoder::new(
                    Vec::with_capacity(data.len() / 2),
                    bzip2::Compression::new(BEST_LEVEL),
                );
                enc.write_all(data).and_then(|_| enc.finish())
            }
            Compression::Gzip => {
                let mut enc = flate2::write::GzEncoder::new(
                    Vec::with_capacity(data.len() / 2),
                    flate2::Compression::new(BEST_LEVEL),
                );
                enc.write_all(data).and_then(|_| enc.finish())
            }
            Compression::Xz => {
                let mut enc =
                    xz2::write::XzEncoder::new(Vec::with_capacity(data.len() / 2), XZ_PRESET);
                enc.write_all(data).and_then(|_| enc.finish())
            }
        };

        compressed.map_err(|e| self.error(e))
    }

    /// Decompress a complete stream produced by [`Compression::compress`]
    ///
    /// Concatenated streams are accepted and decoded back to back.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 4);
        let read = match self {
            Compression::Bz2 => bzip2::read::MultiBzDecoder::new(data).read_to_end(&mut out),
            Compression::Gzip => flate2::read::MultiGzDecoder::new(data).read_to_end(&mut out),
            Compression::Xz => xz2::read::XzDecoder::new_multi_decoder(data).read_to_end(&mut out),
        };

        read.map_err(|e| self.error(e))?;
        Ok(out)
    }

    /// Magic bytes opening a stream of this algorithm
    pub fn magic(self) -> &'static [u8] {
        match self {
            Compression::Bz2 => b"BZh",
            Compression::Gzip => &[0x1f, 0x8b],
            Compression::Xz => &[0xfd, b'7', b'z', b'X', b'Z', 0x00],
        }
    }

    /// Identify the algorithm whose magic bytes open `prefix`
    pub fn detect(prefix: &[u8]) -> Option<Compression> {
        Compression::ALL
            .into_iter()
            .find(|c| prefix.starts_with(c.magic()))
    }

    fn error(self, e: std::io::Error) -> DictError {
        DictError::Compression {
            algorithm: self,
            message: e.to_string(),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bz2" => Ok(Compression::Bz2),
            "gzip" => Ok(Compression::Gzip),
            "xz" => Ok(Compression::Xz),
            other => Err(DictError::Configuration(format!(
                "unknown compression `{}`, expected one of: bz2, gzip, xz",
                other
            ))),
        }
    }
}
