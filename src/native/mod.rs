// In: src/native/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Native Layer
// ====================================================================================
//
// Everything that touches libosrmc's C API lives here. Nothing above this module
// sees a raw pointer or an `osrmc_error_t`.
//
//   1. [api::NativeApi]           -> one unsafe method per exported `osrmc_*` symbol
//         |
//         `-> implemented by [library::NativeLibrary] (the loaded .so, init-once)
//         `-> implemented by [mock::MockOsrmc] in tests (leak-counting double)
//
//   2. [error_channel::call]      -> every fallible call goes through here; a
//                                    populated error slot becomes a `NativeFailure`
//
//   3. [handle::Handle<K>]        -> move-only owner of one native object; its
//                                    destructor runs exactly once from `Drop`
//
// ====================================================================================
pub mod api;
pub(crate) mod error_channel;
pub mod handle;
pub mod library;

#[cfg(test)]
pub(crate) mod mock;

pub use api::NativeApi;
pub use handle::{ConfigHandle, Handle, HandleKind, OsrmHandle};
pub use library::NativeLibrary;
