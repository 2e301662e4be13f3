//! Typed JSON codec for structured store values.
//!
//! Service-area documents and import metadata are stored as JSON strings.
//! Every read and write of those values goes through [`encode`] and
//! [`decode`], so a value that fails to parse is reported as a
//! [`LookupError::MalformedRecord`] naming its key.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LookupError;

/// Serialize a value for storage under `key`.
///
/// # Errors
///
/// Returns `LookupError::MalformedRecord` if the value cannot be serialized.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, LookupError> {
    serde_json::to_string(value)
        .map_err(|e| LookupError::MalformedRecord(format!("{key}: cannot encode: {e}")))
}

/// Deserialize a value read from `key`.
///
/// # Errors
///
/// Returns `LookupError::MalformedRecord` if `raw` is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, LookupError> {
    serde_json::from_str(raw)
        .map_err(|e| LookupError::MalformedRecord(format!("{key}: cannot decode: {e}")))
}
