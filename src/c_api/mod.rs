//! C API for geoblob
//!
//! A stable C ABI over the same handle, lookup and translation code the
//! foreign predicates use. Every call returns a `GEOBLOB_*` status code;
//! the message for the last failure on the calling thread is available from
//! [`geoblob_last_error`]. The header is generated into
//! `include/geoblob/geoblob.h` at build time.

mod error;
mod geoblob;

pub use error::{
    geoblob_last_error, GEOBLOB_ERROR_DOMAIN, GEOBLOB_ERROR_EXISTENCE,
    GEOBLOB_ERROR_INVALID_PARAM, GEOBLOB_ERROR_PERMISSION, GEOBLOB_ERROR_TYPE, GEOBLOB_SUCCESS,
};
pub use geoblob::{
    geoblob_close, geoblob_compare, geoblob_free_string, geoblob_lookup_json, geoblob_open,
    geoblob_release, geoblob_retain, geoblob_t, geoblob_version, geoblob_write,
};
