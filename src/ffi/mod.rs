//! This module serves as the public API for the Foreign Function Interface (FFI) layer.
//!
//! It declares the bindings that expose the engine to other language
//! ecosystems. Currently it only contains the Python bridge, compiled in with
//! the `python` feature.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Contains all logic for interfacing with the Python/CPython ecosystem via `pyo3`.
#[cfg(feature = "python")]
pub mod python;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
#[cfg(feature = "python")]
pub use self::python::{enable_verbose_logging_py, PyEngine, PyRoute};
