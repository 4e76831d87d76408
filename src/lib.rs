//! This file is the root of the `osrmc` Rust crate: safe bindings over the
//! libosrmc C routing API.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`native`, `engine`, etc.)
//!     and re-exporting the types most callers need.
//! 2.  Defining the `#[pymodule]` which acts as the main entry point when the
//!     compiled library is imported into Python (feature `python`).

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod native;
pub mod request;
pub mod response;
pub mod types;

mod ffi;

pub use config::{
    Annotations, Bearing, ContinueStraight, Geometries, LibraryConfig, Overview, RouteOptions,
};
pub use engine::Engine;
pub use error::{OsrmError, Result};
pub use request::{RouteRequestBuilder, TableRequestBuilder};
pub use response::{RouteResponse, RouteResult, TableResponse, TableResult};
pub use types::Coordinate;

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use ffi::{PyEngine, PyRoute};
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `osrmc` Python module, containing all exposed Rust classes and functions.
#[cfg(feature = "python")]
#[pymodule]
fn osrmc(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // --- Classes ---
    m.add_class::<PyEngine>()?;
    m.add_class::<PyRoute>()?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    // --- Turn on logging of library load, engine and request diagnostics ---
    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;

    Ok(())
}
