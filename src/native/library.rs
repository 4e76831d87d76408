// In: src/native/library.rs

//! The process-wide libosrmc shared object.
//!
//! The library is opened at most once per process, on first use, and never
//! reopened or unloaded. The ABI version is checked right after loading.
//! Resolved function pointers are copied out of their `Symbol`s; they stay
//! valid because the `Library` they came from lives inside the same
//! `'static` value.

use libloading::Library;
use once_cell::sync::OnceCell;
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LibraryConfig;
use crate::error::{OsrmError, Result};
use crate::native::api::{NativeApi, RawError, RawHandle, OSRMC_VERSION_MAJOR};

static LIBRARY: OnceCell<Arc<NativeLibrary>> = OnceCell::new();

/// Declares the symbol table and its loader from one list, so a symbol can't
/// be declared without being resolved.
macro_rules! osrmc_symbols {
    ($($field:ident: fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        struct Symbols {
            $($field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*
        }

        impl Symbols {
            unsafe fn resolve(lib: &Library) -> Result<Self> {
                Ok(Self {
                    $($field: *lib.get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                        concat!("osrmc_", stringify!($field), "\0").as_bytes(),
                    )?,)*
                })
            }
        }
    };
}

osrmc_symbols! {
    get_version: fn() -> c_uint;
    is_abi_compatible: fn() -> c_int;
    error_code: fn(RawError) -> *const c_char;
    error_message: fn(RawError) -> *const c_char;
    error_destruct: fn(RawError);
    config_construct: fn(*const c_char, *mut RawError) -> RawHandle;
    config_destruct: fn(RawHandle);
    osrm_construct: fn(RawHandle, *mut RawError) -> RawHandle;
    osrm_destruct: fn(RawHandle);
    route_params_construct: fn(*mut RawError) -> RawHandle;
    route_params_destruct: fn(RawHandle);
    table_params_construct: fn(*mut RawError) -> RawHandle;
    table_params_destruct: fn(RawHandle);
    table_annotations_construct: fn(*mut RawError) -> RawHandle;
    table_annotations_destruct: fn(RawHandle);
    table_annotations_enable_distance: fn(RawHandle, bool, *mut RawError);
    table_params_set_annotations: fn(RawHandle, RawHandle, *mut RawError);
    params_add_coordinate: fn(RawHandle, f32, f32, *mut RawError);
    params_add_coordinate_with: fn(RawHandle, f32, f32, f32, c_int, c_int, *mut RawError);
    route: fn(RawHandle, RawHandle, *const c_char, *mut RawError) -> RawHandle;
    route_response_destruct: fn(RawHandle);
    route_response_distance: fn(RawHandle, c_ulong, *mut RawError) -> f32;
    route_response_duration: fn(RawHandle, c_ulong, *mut RawError) -> f32;
    table: fn(RawHandle, RawHandle, *mut RawError) -> RawHandle;
    table_response_destruct: fn(RawHandle);
    table_response_duration: fn(RawHandle, c_ulong, c_ulong, *mut RawError) -> f32;
    table_response_distance: fn(RawHandle, c_ulong, c_ulong, *mut RawError) -> f32;
    response_json: fn(RawHandle) -> *const c_char;
}

/// The loaded libosrmc library.
pub struct NativeLibrary {
    path: PathBuf,
    symbols: Symbols,
    // Declared last: symbols must not outlive the library.
    _library: Library,
}

impl NativeLibrary {
    /// Returns the process-wide library, loading it on first call.
    ///
    /// Later calls return the already loaded library even if `config` names a
    /// different path; the mismatch is logged.
    pub fn global(config: &LibraryConfig) -> Result<Arc<NativeLibrary>> {
        let library = LIBRARY.get_or_try_init(|| Self::open(config).map(Arc::new))?;
        if library.path != config.library_path {
            log::warn!(
                "libosrmc already loaded from {}; ignoring request to load {}",
                library.path.display(),
                config.library_path.display()
            );
        }
        Ok(Arc::clone(library))
    }

    fn open(config: &LibraryConfig) -> Result<Self> {
        log::debug!("loading libosrmc from {}", config.library_path.display());

        // SAFETY: loading runs the library's initialisers; libosrmc has no
        // initialisation side effects beyond its C++ runtime.
        let library = unsafe { Library::new(&config.library_path)? };
        // SAFETY: every signature in `osrmc_symbols!` matches osrmc.h.
        let symbols = unsafe { Symbols::resolve(&library)? };

        let loaded = Self {
            path: config.library_path.clone(),
            symbols,
            _library: library,
        };

        let version = loaded.version();
        log::debug!(
            "libosrmc version {}.{}.{}",
            version >> 16,
            (version >> 8) & 0xff,
            version & 0xff
        );
        if config.require_abi_compatible && !loaded.is_abi_compatible() {
            return Err(OsrmError::AbiMismatch {
                found: version,
                expected: OSRMC_VERSION_MAJOR,
            });
        }

        Ok(loaded)
    }

    /// Location the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeApi for NativeLibrary {
    fn version(&self) -> u32 {
        unsafe { (self.symbols.get_version)() }
    }

    fn is_abi_compatible(&self) -> bool {
        unsafe { (self.symbols.is_abi_compatible)() != 0 }
    }

    unsafe fn error_code(&self, error: RawError) -> *const c_char {
        (self.symbols.error_code)(error)
    }

    unsafe fn error_message(&self, error: RawError) -> *const c_char {
        (self.symbols.error_message)(error)
    }

    unsafe fn error_destruct(&self, error: RawError) {
        (self.symbols.error_destruct)(error)
    }

    unsafe fn config_construct(&self, base_path: *const c_char, error: *mut RawError) -> RawHandle {
        (self.symbols.config_construct)(base_path, error)
    }

    unsafe fn config_destruct(&self, config: RawHandle) {
        (self.symbols.config_destruct)(config)
    }

    unsafe fn osrm_construct(&self, config: RawHandle, error: *mut RawError) -> RawHandle {
        (self.symbols.osrm_construct)(config, error)
    }

    unsafe fn osrm_destruct(&self, osrm: RawHandle) {
        (self.symbols.osrm_destruct)(osrm)
    }

    unsafe fn route_params_construct(&self, error: *mut RawError) -> RawHandle {
        (self.symbols.route_params_construct)(error)
    }

    unsafe fn route_params_destruct(&self, params: RawHandle) {
        (self.symbols.route_params_destruct)(params)
    }

    unsafe fn table_params_construct(&self, error: *mut RawError) -> RawHandle {
        (self.symbols.table_params_construct)(error)
    }

    unsafe fn table_params_destruct(&self, params: RawHandle) {
        (self.symbols.table_params_destruct)(params)
    }

    unsafe fn table_annotations_construct(&self, error: *mut RawError) -> RawHandle {
        (self.symbols.table_annotations_construct)(error)
    }

    unsafe fn table_annotations_destruct(&self, annotations: RawHandle) {
        (self.symbols.table_annotations_destruct)(annotations)
    }

    unsafe fn table_annotations_enable_distance(
        &self,
        annotations: RawHandle,
        enable: bool,
        error: *mut RawError,
    ) {
        (self.symbols.table_annotations_enable_distance)(annotations, enable, error)
    }

    unsafe fn table_params_set_annotations(
        &self,
        params: RawHandle,
        annotations: RawHandle,
        error: *mut RawError,
    ) {
        (self.symbols.table_params_set_annotations)(params, annotations, error)
    }

    unsafe fn params_add_coordinate(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        error: *mut RawError,
    ) {
        (self.symbols.params_add_coordinate)(params, longitude, latitude, error)
    }

    unsafe fn params_add_coordinate_with(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        radius: f32,
        bearing: c_int,
        range: c_int,
        error: *mut RawError,
    ) {
        (self.symbols.params_add_coordinate_with)(
            params, longitude, latitude, radius, bearing, range, error,
        )
    }

    unsafe fn route(
        &self,
        osrm: RawHandle,
        params: RawHandle,
        options_json: *const c_char,
        error: *mut RawError,
    ) -> RawHandle {
        (self.symbols.route)(osrm, params, options_json, error)
    }

    unsafe fn route_response_destruct(&self, response: RawHandle) {
        (self.symbols.route_response_destruct)(response)
    }

    unsafe fn route_response_distance(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        (self.symbols.route_response_distance)(response, index, error)
    }

    unsafe fn route_response_duration(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        (self.symbols.route_response_duration)(response, index, error)
    }

    unsafe fn table(&self, osrm: RawHandle, params: RawHandle, error: *mut RawError) -> RawHandle {
        (self.symbols.table)(osrm, params, error)
    }

    unsafe fn table_response_destruct(&self, response: RawHandle) {
        (self.symbols.table_response_destruct)(response)
    }

    unsafe fn table_response_duration(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        (self.symbols.table_response_duration)(response, from, to, error)
    }

    unsafe fn table_response_distance(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        (self.symbols.table_response_distance)(response, from, to, error)
    }

    unsafe fn response_json(&self, response: RawHandle) -> *const c_char {
        (self.symbols.response_json)(response)
    }
}
