//! # compressed-dictionary
//!
//! A key-value store whose values stay compressed in memory:
//! - Integer keys, JSON-serializable values
//! - `bz2`, `gzip` or `xz` compression per dictionary
//! - Compact, self-describing file format
//! - Merge, combine and split without recompressing payloads
//! - Streaming combine of dumps that never loads them whole
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CompressedDictionary                        │
//! │        get / insert / remove / iterate / equality            │
//! └───────────┬──────────────────────────────┬──────────────────┘
//!             │ typed values                 │ raw payloads
//!             ▼                              ▼
//!   ┌──────────────────┐          ┌─────────────────────────┐
//!   │    Transcoder    │          │  Structural Operations  │
//!   │ JSON ⇄ payload   │          │ merge / combine / split │
//!   └────────┬─────────┘          └────────────┬────────────┘
//!            │                                 │
//!            ▼                                 ▼
//!   ┌──────────────────┐          ┌─────────────────────────┐
//!   │   Compression    │          │      Record Stream      │
//!   │  bz2 / gzip / xz │          │  length-prefixed file   │
//!   └──────────────────┘          └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use compressed_dictionary::{Compression, CompressedDictionary};
//! use serde_json::json;
//!
//! # fn main() -> compressed_dictionary::Result<()> {
//! let mut dict = CompressedDictionary::new(Compression::Bz2);
//! dict.insert(0, &json!("this is a string!"))?;
//! dict.dump("file.cdict")?;
//!
//! let loaded = CompressedDictionary::load("file.cdict")?;
//! assert_eq!(loaded, dict);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod compression;
pub mod transcode;
pub mod record;
pub mod mapping;
pub mod dictionary;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DictError, Result};
pub use config::{CombineOptions, DumpOptions, LoadOptions, SplitOptions};
pub use compression::Compression;
pub use mapping::Mapping;
pub use dictionary::{CombineStats, CompressedDictionary, Splits};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of compressed-dictionary
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
