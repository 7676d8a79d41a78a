//! Record Stream Module
//!
//! Frames discrete payloads into a file as length-prefixed records.
//!
//! ## Responsibilities
//! - Length-prefix every payload so raw compressed bytes need no escaping
//! - Pack integer keys in front of their compressed values
//! - Carry the dictionary metadata as the first record
//! - Detect truncated files
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Record 0 (metadata)                         │
//! │ ┌──────────┬──────────────────────────────┐ │
//! │ │ Len (4)  │ JSON {"compression": "bz2"}  │ │
//! │ └──────────┴──────────────────────────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Record 1..N (key-value)                     │
//! │ ┌──────────┬──────────┬───────────────────┐ │
//! │ │ Len (4)  │ Key (8)  │ Compressed value  │ │
//! │ └──────────┴──────────┴───────────────────┘ │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. `Len` is unsigned and counts the bytes
//! following it; `Key` is signed. The value length is implicit
//! (`Len - 8`). End of file is reached when no byte at all is available where
//! the next `Len` is expected.

mod metadata;
mod reader;
mod writer;

pub use metadata::Metadata;
pub use reader::{FileRecordReader, KeyValues, RecordReader};
pub use writer::{FileRecordWriter, RecordWriter};

/// Width of the record length prefix
pub const LENGTH_WIDTH: usize = 4;

/// Width of the packed key in a key-value record
pub const KEY_WIDTH: usize = 8;
