// In: src/error.rs

//! This module defines the single, unified error type for the osrmc binding.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant that originates in the native layer carries the name of the
//! native operation and the native message verbatim, so a failure can be
//! diagnosed without knowing anything about libosrmc internals.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsrmError {
    // =========================================================================
    // === Native-Layer Errors (reported through the error channel)
    // =========================================================================
    /// A native object (config, engine, parameters) could not be built.
    #[error("{operation} failed to construct native object{}: {message}", fmt_code(.code))]
    Construction {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    /// The routing engine rejected a request, or a response accessor failed.
    #[error("{operation} rejected{}: {message}", fmt_code(.code))]
    Request {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    // =========================================================================
    // === Binding-Side Errors (detected before or after crossing into native code)
    // =========================================================================
    /// A caller-supplied index is outside the matrix of an N-coordinate request.
    #[error("{operation}: index ({source_index}, {destination_index}) out of bounds for {len} coordinates")]
    Index {
        operation: &'static str,
        source_index: usize,
        destination_index: usize,
        len: usize,
    },

    /// The JSON bridge received something other than a well-formed response object.
    #[error("{operation}: unexpected response shape: {message}")]
    Conversion {
        operation: &'static str,
        message: String,
    },

    #[error("libosrmc ABI mismatch: library reports version {found:#x}, binding expects major {expected}")]
    AbiMismatch { found: u32, expected: u32 },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// The shared library or one of its symbols could not be loaded.
    #[error("Native library loading failed: {0}")]
    Library(#[from] libloading::Error),

    /// An error from the Serde JSON library, typically while marshaling route options.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OsrmError>;

fn fmt_code(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" [{}]", code),
        None => String::new(),
    }
}

impl OsrmError {
    /// Builds a `Request` error that never reached the native layer.
    pub(crate) fn invalid_request(operation: &'static str, message: impl Into<String>) -> Self {
        OsrmError::Request {
            operation,
            code: None,
            message: message.into(),
        }
    }

    /// The native error message, if this error came from the error channel.
    pub fn native_message(&self) -> Option<&str> {
        match self {
            OsrmError::Construction { message, .. } | OsrmError::Request { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// The native error code (e.g. `"NoRoute"`), if the native layer supplied one.
    pub fn native_code(&self) -> Option<&str> {
        match self {
            OsrmError::Construction { code, .. } | OsrmError::Request { code, .. } => {
                code.as_deref()
            }
            _ => None,
        }
    }
}

// =============================================================================
// === Python Exception Mapping ===
// =============================================================================

#[cfg(feature = "python")]
impl From<OsrmError> for pyo3::PyErr {
    fn from(err: OsrmError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIndexError, PyOSError, PyRuntimeError, PyValueError};
        match &err {
            OsrmError::Index { .. } => PyIndexError::new_err(err.to_string()),
            OsrmError::Conversion { .. } | OsrmError::SerdeJson(_) => {
                PyValueError::new_err(err.to_string())
            }
            OsrmError::Request { code: None, .. } => PyValueError::new_err(err.to_string()),
            OsrmError::Io(_) | OsrmError::Library(_) => PyOSError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
