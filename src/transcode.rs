//! Value Transcoder
//!
//! Turns structured values into compressed payloads and back.
//!
//! ## Payload Layout
//! ```text
//! value ──serde_json──▶ UTF-8 text ──compress──▶ payload
//! ```
//!
//! A payload is self-delimited by its compression stream, so the record layer
//! never needs to look inside it.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::compression::Compression;
use crate::error::{DictError, Result};

/// Encode a value into a compressed payload
pub fn encode(value: &Value, compression: Compression) -> Result<Bytes> {
    encode_serialize(value, compression)
}

/// Decode a compressed payload back into a value
pub fn decode(payload: &[u8], compression: Compression) -> Result<Value> {
    decode_deserialize(payload, compression)
}

/// Encode any serializable type through its JSON form
pub fn encode_serialize<T: Serialize + ?Sized>(value: &T, compression: Compression) -> Result<Bytes> {
    let text = serde_json::to_string(value)?;
    let payload = compression.compress(text.as_bytes())?;
    Ok(Bytes::from(payload))
}

/// Decode a payload straight into a deserializable type
pub fn decode_deserialize<T: DeserializeOwned>(payload: &[u8], compression: Compression) -> Result<T> {
    let raw = compression.decompress(payload)?;
    let text = std::str::from_utf8(&raw)
        .map_err(|e| DictError::Serialization(format!("payload is not valid UTF-8: {}", e)))?;
    Ok(serde_json::from_str(text)?)
}

/// Move a payload from one compression to another
///
/// The intermediate value never leaves this function. Payloads already in the
/// target compression are returned as-is.
pub fn reencode(payload: &Bytes, from: Compression, to: Compression) -> Result<Bytes> {
    if from == to {
        return Ok(payload.clone());
    }
    let value = decode(payload, from)?;
    encode(&value, to)
}
