// In: src/native/api.rs

//! The C boundary of libosrmc, expressed as a trait.
//!
//! Every method maps one-to-one onto an exported `osrmc_*` symbol and keeps its
//! C shape: opaque pointers in, opaque pointers or scalars out, and an
//! `osrmc_error_t*` out-parameter on every fallible call. The methods are
//! `unsafe` and are only ever called through [`crate::native::error_channel`]
//! and [`crate::native::handle`], which own the checking and cleanup rules.
//!
//! [`crate::native::NativeLibrary`] implements the trait over the loaded shared
//! object; tests substitute an instrumented double.

use std::os::raw::{c_char, c_int, c_ulong, c_void};

/// An opaque pointer to any native object (config, engine, params, response).
pub type RawHandle = *mut c_void;

/// An opaque pointer to a native `osrmc_error` object. Null means "no error".
pub type RawError = *mut c_void;

/// Major ABI version this binding is written against.
pub const OSRMC_VERSION_MAJOR: u32 = 5;

pub trait NativeApi: Send + Sync {
    // --- ABI stability ---
    fn version(&self) -> u32;
    fn is_abi_compatible(&self) -> bool;

    // --- Error objects ---
    unsafe fn error_code(&self, error: RawError) -> *const c_char;
    unsafe fn error_message(&self, error: RawError) -> *const c_char;
    unsafe fn error_destruct(&self, error: RawError);

    // --- Config / engine ---
    /// A null `base_path` selects shared-memory mode.
    unsafe fn config_construct(&self, base_path: *const c_char, error: *mut RawError)
        -> RawHandle;
    unsafe fn config_destruct(&self, config: RawHandle);
    unsafe fn osrm_construct(&self, config: RawHandle, error: *mut RawError) -> RawHandle;
    unsafe fn osrm_destruct(&self, osrm: RawHandle);

    // --- Parameters ---
    unsafe fn route_params_construct(&self, error: *mut RawError) -> RawHandle;
    unsafe fn route_params_destruct(&self, params: RawHandle);
    unsafe fn table_params_construct(&self, error: *mut RawError) -> RawHandle;
    unsafe fn table_params_destruct(&self, params: RawHandle);
    unsafe fn table_annotations_construct(&self, error: *mut RawError) -> RawHandle;
    unsafe fn table_annotations_destruct(&self, annotations: RawHandle);
    unsafe fn table_annotations_enable_distance(
        &self,
        annotations: RawHandle,
        enable: bool,
        error: *mut RawError,
    );
    /// Copies the annotation set into `params`; `annotations` may be
    /// destructed afterwards.
    unsafe fn table_params_set_annotations(
        &self,
        params: RawHandle,
        annotations: RawHandle,
        error: *mut RawError,
    );
    unsafe fn params_add_coordinate(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        error: *mut RawError,
    );
    #[allow(clippy::too_many_arguments)]
    unsafe fn params_add_coordinate_with(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        radius: f32,
        bearing: c_int,
        range: c_int,
        error: *mut RawError,
    );

    // --- Route service ---
    /// Returns null without setting `error` when the engine produced no route.
    unsafe fn route(
        &self,
        osrm: RawHandle,
        params: RawHandle,
        options_json: *const c_char,
        error: *mut RawError,
    ) -> RawHandle;
    unsafe fn route_response_destruct(&self, response: RawHandle);
    unsafe fn route_response_distance(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32;
    unsafe fn route_response_duration(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32;

    // --- Table service ---
    unsafe fn table(&self, osrm: RawHandle, params: RawHandle, error: *mut RawError)
        -> RawHandle;
    unsafe fn table_response_destruct(&self, response: RawHandle);
    unsafe fn table_response_duration(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32;
    /// Fails with `NoTable` unless distances were requested.
    unsafe fn table_response_distance(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32;

    // --- JSON ---
    /// The full response serialized as JSON. The string is owned by the
    /// response and valid until the response is destructed.
    unsafe fn response_json(&self, response: RawHandle) -> *const c_char;
}
