// In: src/native/handle.rs

//! Ownership of opaque native objects.
//!
//! A [`Handle<K>`] is the only owner of one live native object of kind `K`.
//! It cannot be cloned or copied, only moved, and its matching
//! `osrmc_*_destruct` runs exactly once from `Drop`: on success, on an early
//! `?` return, and during unwinding. A failed construction never produces a
//! `Handle`, so nothing is ever destructed that was not constructed.

use std::ffi::CString;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::{OsrmError, Result};
use crate::native::api::{NativeApi, RawError, RawHandle};
use crate::native::error_channel::{self, NativeFailure};

/// A kind of native object, naming its destructor.
pub trait HandleKind {
    const NAME: &'static str;

    /// # Safety
    /// `raw` must be a live object of this kind, and is dead afterwards.
    unsafe fn destruct(api: &dyn NativeApi, raw: RawHandle);
}

macro_rules! handle_kinds {
    ($($(#[$doc:meta])* $kind:ident => $destruct:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub enum $kind {}

            impl HandleKind for $kind {
                const NAME: &'static str = stringify!($kind);

                unsafe fn destruct(api: &dyn NativeApi, raw: RawHandle) {
                    api.$destruct(raw)
                }
            }
        )*
    };
}

handle_kinds! {
    /// `osrmc_config_t`
    Config => config_destruct;
    /// `osrmc_osrm_t`, the engine instance.
    Osrm => osrm_destruct;
    /// `osrmc_route_params_t`
    RouteParams => route_params_destruct;
    /// `osrmc_table_params_t`
    TableParams => table_params_destruct;
    /// `osrmc_table_annotations_t`
    TableAnnotations => table_annotations_destruct;
    /// `osrmc_route_response_t`
    RouteResponse => route_response_destruct;
    /// `osrmc_table_response_t`
    TableResponse => table_response_destruct;
}

pub type ConfigHandle = Handle<Config>;

/// Sole owner of one live native object.
pub struct Handle<K: HandleKind> {
    raw: NonNull<std::os::raw::c_void>,
    api: Arc<dyn NativeApi>,
    _kind: PhantomData<K>,
}

impl<K: HandleKind> Handle<K> {
    /// Runs a native constructor through the error channel and takes
    /// ownership of the object it returns.
    ///
    /// Fails with `Construction` if the slot is populated or the returned
    /// pointer is null.
    pub(crate) fn construct_with(
        api: &Arc<dyn NativeApi>,
        operation: &'static str,
        native: impl FnOnce(*mut RawError) -> RawHandle,
    ) -> Result<Self> {
        let raw = error_channel::call(api.as_ref(), operation, native)
            .map_err(NativeFailure::into_construction)?;
        Self::adopt(api, raw).ok_or_else(|| OsrmError::Construction {
            operation,
            code: None,
            message: format!("native layer returned a null {} handle", K::NAME),
        })
    }

    /// Takes ownership of `raw`, or returns `None` for a null pointer.
    pub(crate) fn adopt(api: &Arc<dyn NativeApi>, raw: RawHandle) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self {
            raw,
            api: Arc::clone(api),
            _kind: PhantomData,
        })
    }

    /// The raw pointer, for passing to native calls. Never outlives `self`.
    pub(crate) fn as_raw(&self) -> RawHandle {
        self.raw.as_ptr()
    }

    pub(crate) fn api(&self) -> &Arc<dyn NativeApi> {
        &self.api
    }
}

impl<K: HandleKind> Drop for Handle<K> {
    fn drop(&mut self) {
        log::trace!("destructing {} handle {:p}", K::NAME, self.raw);
        // SAFETY: `self` is the only owner and the object is still live.
        unsafe { K::destruct(self.api.as_ref(), self.raw.as_ptr()) }
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::NAME).field(&self.raw).finish()
    }
}

// Config and engine are never mutated after construction, and libosrmc
// serves read-only queries from several threads against one engine.
// Request, response and annotation handles stay `!Send`.
unsafe impl Send for Handle<Config> {}
unsafe impl Sync for Handle<Config> {}
unsafe impl Send for Handle<Osrm> {}
unsafe impl Sync for Handle<Osrm> {}

//==================================================================================
// Config / engine construction
//==================================================================================

impl Handle<Config> {
    /// Builds a native engine configuration.
    ///
    /// `Some(path)` loads the data set at `path`; `None` configures the engine
    /// to use a data set already loaded into shared memory.
    pub fn construct(api: &Arc<dyn NativeApi>, base_path: Option<&Path>) -> Result<Self> {
        const OP: &str = "osrmc_config_construct";

        let base_path = base_path.map(|p| path_to_cstring(OP, p)).transpose()?;
        let base_path_ptr = base_path
            .as_ref()
            .map_or(std::ptr::null(), |p| p.as_ptr());

        Self::construct_with(api, OP, |err| unsafe {
            api.config_construct(base_path_ptr, err)
        })
    }
}

/// A queryable engine instance together with the config it was built from.
///
/// The native engine reads its config for as long as it lives, so the handle
/// shares ownership of the config: the config is destructed only after every
/// engine built from it is gone.
#[derive(Debug)]
pub struct OsrmHandle {
    // Declared first: the engine is destructed before its config reference drops.
    engine: Handle<Osrm>,
    config: Arc<ConfigHandle>,
}

impl OsrmHandle {
    /// Builds an engine bound to `config`.
    pub fn construct(config: Arc<ConfigHandle>) -> Result<Self> {
        let api = config.api();
        let engine = Handle::construct_with(api, "osrmc_osrm_construct", |err| unsafe {
            api.osrm_construct(config.as_raw(), err)
        })?;
        Ok(Self { engine, config })
    }

    /// The config this engine reads from.
    pub fn config(&self) -> &Arc<ConfigHandle> {
        &self.config
    }

    pub(crate) fn as_raw(&self) -> RawHandle {
        self.engine.as_raw()
    }

    pub(crate) fn api(&self) -> &Arc<dyn NativeApi> {
        self.engine.api()
    }
}

fn path_to_cstring(operation: &'static str, path: &Path) -> Result<CString> {
    let text = path.to_str().ok_or_else(|| OsrmError::Construction {
        operation,
        code: None,
        message: format!("base path {} is not valid UTF-8", path.display()),
    })?;
    CString::new(text).map_err(|_| OsrmError::Construction {
        operation,
        code: None,
        message: format!("base path {:?} contains a NUL byte", text),
    })
}
