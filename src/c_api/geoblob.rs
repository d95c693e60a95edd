//! Geoblob C API
//!
//! A `geoblob_t *` is one reference to a geoip handle. `geoblob_retain`
//! hands out another reference to the same handle and `geoblob_release`
//! gives one back; the native database is released when the last reference
//! goes, unless `geoblob_close` released it earlier.

use super::error::{clear_last_error, fail, invalid_param, GEOBLOB_SUCCESS};
use crate::address;
use crate::error::GeoError;
use crate::handle::{self, GeoDb, GEODB_MAGIC};
use crate::host::Blob;
use crate::record;
use std::cmp::Ordering;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Opaque geoip handle reference
#[repr(C)]
pub struct geoblob_t {
    _private: [u8; 0],
}

struct GeoblobInternal {
    magic: u32,
    blob: Blob,
}

impl geoblob_t {
    fn from_internal(internal: Box<GeoblobInternal>) -> *mut Self {
        Box::into_raw(internal) as *mut Self
    }

    unsafe fn into_internal(ptr: *mut Self) -> Box<GeoblobInternal> {
        Box::from_raw(ptr as *mut GeoblobInternal)
    }

    /// Borrow the internal structure if the pointer carries the magic
    unsafe fn as_internal<'a>(ptr: *const Self) -> Option<&'a GeoblobInternal> {
        if ptr.is_null() {
            return None;
        }
        let internal = &*(ptr as *const GeoblobInternal);
        (internal.magic == GEODB_MAGIC).then_some(internal)
    }
}

fn new_reference(blob: Blob) -> *mut geoblob_t {
    geoblob_t::from_internal(Box::new(GeoblobInternal {
        magic: GEODB_MAGIC,
        blob,
    }))
}

unsafe fn blob<'a>(db: *const geoblob_t) -> Result<&'a Blob, c_int> {
    geoblob_t::as_internal(db)
        .map(|internal| &internal.blob)
        .ok_or_else(|| invalid_param("not a geoblob handle"))
}

unsafe fn geodb<'a>(db: *const geoblob_t) -> Result<&'a GeoDb, c_int> {
    let blob = blob(db)?;
    handle::from_blob(blob, blob).map_err(|e| fail(&e))
}

unsafe fn c_str<'a>(s: *const c_char, what: &str) -> Result<&'a str, c_int> {
    if s.is_null() {
        return Err(invalid_param(&format!("{} is NULL", what)));
    }
    CStr::from_ptr(s)
        .to_str()
        .map_err(|_| invalid_param(&format!("{} is not valid UTF-8", what)))
}

fn status(result: Result<(), c_int>) -> c_int {
    match result {
        Ok(()) => {
            clear_last_error();
            GEOBLOB_SUCCESS
        }
        Err(code) => code,
    }
}

/// Open a geoip database
///
/// # Parameters
/// * `filename` - Path to the database file (null-terminated C string)
/// * `mode` - One of `standard`, `memory_cache`, `check_cache`,
///   `index_cache`, `mmap_cache`
/// * `out` - Receives the new handle, or NULL on failure
///
/// # Returns
/// * `GEOBLOB_SUCCESS` on success
/// * `GEOBLOB_ERROR_EXISTENCE` if the file does not exist
/// * `GEOBLOB_ERROR_DOMAIN` for an unknown mode
/// * `GEOBLOB_ERROR_PERMISSION` if the file cannot be read or is rejected
/// * `GEOBLOB_ERROR_INVALID_PARAM` for NULL or non-UTF-8 arguments
///
/// # Safety
/// * `filename` and `mode` must be NULL or valid null-terminated C strings
/// * `out` must be NULL or point to writable storage for a pointer
///
/// # Example
/// ```c
/// geoblob_t *db = NULL;
/// if (geoblob_open("GeoLite2-City.mmdb", "standard", &db) != GEOBLOB_SUCCESS) {
///     fprintf(stderr, "%s\n", geoblob_last_error());
///     return 1;
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn geoblob_open(
    filename: *const c_char,
    mode: *const c_char,
    out: *mut *mut geoblob_t,
) -> c_int {
    if out.is_null() {
        return invalid_param("out is NULL");
    }
    *out = ptr::null_mut();

    status((|| -> Result<(), c_int> {
        let path = c_str(filename, "filename")?;
        let mode = c_str(mode, "mode")?;
        let db = GeoDb::open_named(path, mode).map_err(|e| fail(&e))?;
        *out = new_reference(Blob::new(db));
        Ok(())
    })())
}

/// Release the native database early
///
/// The handle stays allocated; lookups on it fail with
/// `GEOBLOB_ERROR_PERMISSION` until it is released.
///
/// # Returns
/// * `GEOBLOB_SUCCESS` on success
/// * `GEOBLOB_ERROR_PERMISSION` if already closed
/// * `GEOBLOB_ERROR_INVALID_PARAM` if `db` is not a handle
///
/// # Safety
/// * `db` must be NULL or a handle not yet passed to `geoblob_release`
#[no_mangle]
pub unsafe extern "C" fn geoblob_close(db: *mut geoblob_t) -> c_int {
    status((|| -> Result<(), c_int> { geodb(db)?.close().map_err(|e| fail(&e)) })())
}

/// Look up `a.b.c.d` and return the result as JSON
///
/// The JSON is an array of `[key, value]` pairs in a fixed key order; an
/// address not in the database gives `[]`.
///
/// # Returns
/// * `GEOBLOB_SUCCESS` on success; `*out_json` must then be freed with
///   `geoblob_free_string`
/// * `GEOBLOB_ERROR_PERMISSION` if the handle is closed or the record
///   cannot be read
/// * `GEOBLOB_ERROR_DOMAIN` if a component is outside 0..255
/// * `GEOBLOB_ERROR_INVALID_PARAM` for a bad handle or NULL `out_json`
///
/// # Safety
/// * `db` must be NULL or a handle not yet passed to `geoblob_release`
/// * `out_json` must be NULL or point to writable storage for a pointer
///
/// # Example
/// ```c
/// char *json = NULL;
/// if (geoblob_lookup_json(db, 8, 8, 8, 8, &json) == GEOBLOB_SUCCESS) {
///     printf("%s\n", json);
///     geoblob_free_string(json);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn geoblob_lookup_json(
    db: *const geoblob_t,
    a: i64,
    b: i64,
    c: i64,
    d: i64,
    out_json: *mut *mut c_char,
) -> c_int {
    if out_json.is_null() {
        return invalid_param("out_json is NULL");
    }
    *out_json = ptr::null_mut();

    status((|| -> Result<(), c_int> {
        let db = geodb(db)?;
        db.ensure_open().map_err(|e| fail(&e))?;
        let ipnum = address::pack_components([a, b, c, d]).map_err(|e| fail(&e))?;

        let pairs = match db.record_by_ipnum(ipnum).map_err(|e| fail(&e))? {
            Some(record) => record::translate(&record),
            None => Vec::new(),
        };
        let rows: Vec<_> = pairs.iter().map(|p| (&p.key, &p.value)).collect();
        let json = serde_json::to_string(&rows)
            .ok()
            .and_then(|json| CString::new(json).ok())
            .ok_or_else(|| fail(&GeoError::permission("read", "geoip", db)))?;

        *out_json = json.into_raw();
        Ok(())
    })())
}

/// Take another reference to the same handle
///
/// # Returns
/// * A new reference, to be given back with `geoblob_release`
/// * NULL if `db` is not a handle
///
/// # Safety
/// * `db` must be NULL or a handle not yet passed to `geoblob_release`
#[no_mangle]
pub unsafe extern "C" fn geoblob_retain(db: *const geoblob_t) -> *mut geoblob_t {
    match blob(db) {
        Ok(blob) => {
            clear_last_error();
            new_reference(blob.clone())
        }
        Err(_) => ptr::null_mut(),
    }
}

/// Give back one reference
///
/// When the last reference goes, the native database is released if
/// `geoblob_close` did not already do so. NULL is a no-op.
///
/// # Safety
/// * `db` must be NULL or a handle not yet passed to `geoblob_release`
/// * `db` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn geoblob_release(db: *mut geoblob_t) {
    if geoblob_t::as_internal(db).is_none() {
        return;
    }
    let mut internal = geoblob_t::into_internal(db);
    internal.magic = 0;
}

/// Order two handles
///
/// # Returns
/// * 0 if both refer to the same handle
/// * -1 or 1 otherwise, consistently for the lifetime of both handles
/// * 0 if either argument is not a handle
///
/// # Safety
/// * `a` and `b` must each be NULL or a handle not yet released
#[no_mangle]
pub unsafe extern "C" fn geoblob_compare(a: *const geoblob_t, b: *const geoblob_t) -> c_int {
    match (blob(a), blob(b)) {
        (Ok(a), Ok(b)) => match a.cmp(b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        },
        _ => 0,
    }
}

/// Print a handle as `<geoip>(0x...)`
///
/// Writes at most `len - 1` bytes plus a terminating NUL, like `snprintf`.
///
/// # Returns
/// * Length of the full text, excluding the NUL
/// * A negative error code if `db` is not a handle
///
/// # Safety
/// * `db` must be NULL or a handle not yet released
/// * `buf` must be NULL or valid for `len` bytes
#[no_mangle]
pub unsafe extern "C" fn geoblob_write(
    db: *const geoblob_t,
    buf: *mut c_char,
    len: libc::size_t,
) -> c_int {
    let text = match blob(db) {
        Ok(blob) => blob.to_string(),
        Err(code) => return code,
    };

    if !buf.is_null() && len > 0 {
        let n = text.len().min(len - 1);
        ptr::copy_nonoverlapping(text.as_ptr() as *const c_char, buf, n);
        *buf.add(n) = 0;
    }
    clear_last_error();
    c_int::try_from(text.len()).unwrap_or(c_int::MAX)
}

/// Free a string returned by geoblob
///
/// # Safety
/// * `string` must be NULL or a pointer returned by geoblob
/// * Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn geoblob_free_string(string: *mut c_char) {
    if !string.is_null() {
        let _ = CString::from_raw(string);
    }
}

/// Library version string
///
/// Valid for the lifetime of the program; do not free.
#[no_mangle]
pub extern "C" fn geoblob_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
