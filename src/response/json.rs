// In: src/response/json.rs

//! The JSON bridge: one-shot conversion of a native response into an owned
//! `serde_json::Value`.
//!
//! The native string is borrowed from the response object, copied into a Rust
//! `String` before anything else happens, and parsed from that copy. The value
//! returned never points into native memory and outlives the response.

use serde_json::Value;

use crate::error::{OsrmError, Result};
use crate::native::error_channel::copy_native_str;
use crate::native::handle::{Handle, HandleKind, RouteResponse, TableResponse};

const OP: &str = "osrmc_response_json";

/// Handle kinds that hold a JSON response document.
pub trait ResponseKind: HandleKind {}

impl ResponseKind for RouteResponse {}
impl ResponseKind for TableResponse {}

pub(crate) fn to_value<K: ResponseKind>(response: &Handle<K>) -> Result<Value> {
    // SAFETY: `response` is live for the whole call, and the string it
    // returns is only read before this function returns.
    let text = unsafe { copy_native_str(response.api().response_json(response.as_raw())) }
        .ok_or_else(|| OsrmError::Conversion {
            operation: OP,
            message: format!("native layer returned no JSON for {} handle", K::NAME),
        })?;
    parse_document(&text)
}

/// Parses a response document, which must be a JSON object.
pub(crate) fn parse_document(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text).map_err(|e| OsrmError::Conversion {
        operation: OP,
        message: format!("invalid JSON: {}", e),
    })?;
    if !value.is_object() {
        return Err(OsrmError::Conversion {
            operation: OP,
            message: format!("expected a JSON object, got {}", type_name(&value)),
        });
    }
    Ok(value)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
