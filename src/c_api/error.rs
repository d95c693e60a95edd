//! Error codes and the per-thread last error

use crate::error::{ErrorKind, GeoError};
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

/// Success
pub const GEOBLOB_SUCCESS: i32 = 0;
/// Argument of the wrong kind
pub const GEOBLOB_ERROR_TYPE: i32 = -1;
/// Argument outside its domain (bad mode name, address component)
pub const GEOBLOB_ERROR_DOMAIN: i32 = -2;
/// Operation not permitted (closed handle, unreadable or rejected file)
pub const GEOBLOB_ERROR_PERMISSION: i32 = -3;
/// File does not exist
pub const GEOBLOB_ERROR_EXISTENCE: i32 = -4;
/// NULL, non-UTF-8 or foreign pointer argument
pub const GEOBLOB_ERROR_INVALID_PARAM: i32 = -5;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: impl Into<String>) {
    let message = message.into();
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(message).ok();
    });
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Record `err` as the last error and return its code
pub(crate) fn fail(err: &GeoError) -> i32 {
    set_last_error(err.to_string());
    match err.kind() {
        ErrorKind::Type => GEOBLOB_ERROR_TYPE,
        ErrorKind::Domain => GEOBLOB_ERROR_DOMAIN,
        ErrorKind::Permission => GEOBLOB_ERROR_PERMISSION,
        ErrorKind::Existence => GEOBLOB_ERROR_EXISTENCE,
    }
}

/// Record an invalid-parameter message and return its code
pub(crate) fn invalid_param(message: &str) -> i32 {
    set_last_error(message);
    GEOBLOB_ERROR_INVALID_PARAM
}

/// Message of the last failed call on this thread
///
/// # Returns
/// * NULL if the last call on this thread succeeded
/// * Otherwise a pointer valid until the next geoblob call on this thread;
///   do not free it
#[no_mangle]
pub extern "C" fn geoblob_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(message) => message.as_ptr(),
        None => std::ptr::null(),
    })
}
