// In: src/native/error_channel.rs

//! The single choke point through which every fallible native call passes.
//!
//! A native call reports failure by writing an `osrmc_error_t` into the slot it
//! was handed. [`call`] creates that slot, runs the call, and inspects the slot
//! before the caller ever sees the return value: a populated slot turns into a
//! [`NativeFailure`] (code and message copied out as owned text) and is
//! released exactly once, whatever the call returned.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::error::OsrmError;
use crate::native::api::{NativeApi, RawError};

/// A native error after it has been copied out of native memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NativeFailure {
    pub operation: &'static str,
    pub code: Option<String>,
    pub message: String,
}

impl NativeFailure {
    pub fn into_construction(self) -> OsrmError {
        OsrmError::Construction {
            operation: self.operation,
            code: self.code,
            message: self.message,
        }
    }

    pub fn into_request(self) -> OsrmError {
        OsrmError::Request {
            operation: self.operation,
            code: self.code,
            message: self.message,
        }
    }
}

/// The `osrmc_error_t` out-parameter of one native call. Owns whatever error
/// object the call wrote into it.
struct ErrorSlot<'a> {
    api: &'a dyn NativeApi,
    raw: RawError,
}

impl<'a> ErrorSlot<'a> {
    fn new(api: &'a dyn NativeApi) -> Self {
        Self {
            api,
            raw: std::ptr::null_mut(),
        }
    }

    fn as_out_ptr(&mut self) -> *mut RawError {
        &mut self.raw
    }

    /// Copies the error out and releases the native object, or returns
    /// `None` if the call left the slot empty.
    fn take_failure(&mut self, operation: &'static str) -> Option<NativeFailure> {
        if self.raw.is_null() {
            return None;
        }
        // SAFETY: a non-null slot holds an error object written by the native
        // call; its strings live until `error_destruct` below.
        let (code, message) = unsafe {
            (
                copy_native_str(self.api.error_code(self.raw)),
                copy_native_str(self.api.error_message(self.raw)),
            )
        };
        let raw = std::mem::replace(&mut self.raw, std::ptr::null_mut());
        unsafe { self.api.error_destruct(raw) };

        Some(NativeFailure {
            operation,
            code: code.filter(|c| !c.is_empty()),
            message: message.unwrap_or_else(|| "unknown native error".to_string()),
        })
    }
}

impl Drop for ErrorSlot<'_> {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { self.api.error_destruct(self.raw) };
        }
    }
}

/// Copies a borrowed C string into an owned `String`, replacing invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid for
/// the duration of this call.
pub(crate) unsafe fn copy_native_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Runs one fallible native call and checks its error slot.
///
/// `native` receives the slot pointer to pass as the call's `osrmc_error_t*`
/// argument. If the slot comes back populated the call's return value is
/// discarded; a handle returned alongside an error is never adopted.
pub(crate) fn call<T>(
    api: &dyn NativeApi,
    operation: &'static str,
    native: impl FnOnce(*mut RawError) -> T,
) -> Result<T, NativeFailure> {
    let mut slot = ErrorSlot::new(api);
    let value = native(slot.as_out_ptr());
    match slot.take_failure(operation) {
        Some(failure) => {
            log::debug!(
                "{} failed: [{}] {}",
                operation,
                failure.code.as_deref().unwrap_or("-"),
                failure.message
            );
            Err(failure)
        }
        None => Ok(value),
    }
}
