//! This module defines the plain value types passed across the binding's
//! public API.

pub mod coordinate;

// Re-export the main type(s) for easier access.
pub use coordinate::Coordinate;
