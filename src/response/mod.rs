// In: src/response/mod.rs

//! Native response handles and the host-side results decoded from them.
//!
//! A response can be read two ways: through the scalar accessors, which call
//! straight into the native layer, or through the JSON bridge, which copies
//! the whole document out once and exposes it as a `serde_json::Value`.

pub mod json;
pub mod route;
pub mod table;

pub use route::{RouteResponse, RouteResult};
pub use table::{TableResponse, TableResult};
