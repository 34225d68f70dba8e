//! Conversion between JSON text and in-memory document values.
//!
//! [`DocumentValue`] is the interchange format across the host/guest boundary.
//! Mappings keep the key order of the text they were decoded from, so a guest
//! sees object keys in the same order the caller wrote them.

use serde::Serialize;
use thiserror::Error;

/// Canonical decoded form of a JSON text.
pub type DocumentValue = serde_json::Value;

/// Errors produced while decoding or encoding documents.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The input text is not well-formed JSON.
    #[error("failed to parse input JSON at line {line}, column {column}: {message}")]
    Parse {
        /// 1-based line of the offending character.
        line: usize,
        /// 1-based column of the offending character.
        column: usize,
        /// Parser description of the problem.
        message: String,
    },

    /// The value contains something the JSON encoding cannot express.
    #[error("failed to marshal output JSON: {0}")]
    Encode(String),
}

/// Result type for marshaling operations.
pub type MarshalResult<T> = Result<T, MarshalError>;

/// serde_json appends " at line X column Y" to its Display output; the
/// position is already carried in dedicated fields.
fn strip_position(e: &serde_json::Error) -> String {
    let full = e.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

/// Decode JSON text into a document value.
///
/// # Errors
///
/// Returns [`MarshalError::Parse`] on malformed JSON syntax, including
/// trailing garbage and empty input.
pub fn decode(text: &str) -> MarshalResult<DocumentValue> {
    serde_json::from_str(text).map_err(|e| {
        // Type errors cannot occur when the target is `Value`; every failure
        // here is about the text itself.
        MarshalError::Parse {
            line: e.line(),
            column: e.column(),
            message: strip_position(&e),
        }
    })
}

/// Encode a document value as compact JSON text.
///
/// # Errors
///
/// Returns [`MarshalError::Encode`] if the value cannot be represented.
pub fn encode(value: &DocumentValue) -> MarshalResult<String> {
    serde_json::to_string(value).map_err(|e| MarshalError::Encode(e.to_string()))
}

/// Encode a native structured value as compact JSON text.
///
/// # Errors
///
/// Returns [`MarshalError::Encode`] when the value contains members JSON
/// cannot express, such as maps with non-string keys.
pub fn encode_native<T: Serialize + ?Sized>(value: &T) -> MarshalResult<String> {
    serde_json::to_string(value).map_err(|e| MarshalError::Encode(e.to_string()))
}
