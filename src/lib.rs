//! Geoblob - IPv4 Geolocation for Logic-Programming Hosts
//!
//! Geoblob opens a MaxMind DB geolocation database, wraps it in a
//! garbage-collected opaque handle, and answers `ip(A,B,C,D)` lookups with
//! an ordered list of `Key-Value` pairs. The same handle is reachable from
//! host foreign predicates, from Rust, and through a C ABI.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use geoblob::{CacheMode, GeoDb};
//! use std::net::Ipv4Addr;
//!
//! let db = GeoDb::open("GeoLite2-City.mmdb", CacheMode::Standard)?;
//! if let Some(record) = db.lookup(Ipv4Addr::new(8, 8, 8, 8))? {
//!     for pair in geoblob::translate(&record) {
//!         println!("{}-{}", pair.key, pair.value);
//!     }
//! }
//! db.close()?;
//! # Ok::<(), geoblob::GeoError>(())
//! ```
//!
//! # Host Predicates
//!
//! ```rust,no_run
//! use geoblob::host::{ForeignTable, Term};
//!
//! let mut table = ForeignTable::new();
//! geoblob::install(&mut table);
//!
//! let args = [Term::atom("GeoLite2-City.mmdb"), Term::atom("mmap_cache"), Term::Var];
//! let handle = table.call("geoip_open", &args)?.unwrap();
//! let ip = Term::compound("ip", vec![Term::Integer(8); 4]);
//! let pairs = table.call("geoip_lookup_", &[handle.clone(), ip, Term::Var])?;
//! table.call("geoip_close_", &[handle])?;
//! # Ok::<(), geoblob::GeoError>(())
//! ```
//!
//! # Handle Lifecycle
//!
//! ```text
//! geoip_open ──► GeoDb { native: Some(db) } ──► Blob (refcounted)
//!                      │                            │
//!          geoip_close_│                            │ last reference dropped
//!                      ▼                            ▼
//!               native: None  ◄──────────── release hook (if still open)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// IPv4 address decoding
pub mod address;
// Public C API
pub mod c_api;
/// Error types for geoblob operations
pub mod error;
/// The geoip database handle
pub mod handle;
pub mod host;
pub mod mode;
/// Native geolocation engine
pub mod native;
pub mod predicates;
/// Geolocation records and their translation
pub mod record;
mod vocab;

pub use crate::error::{ErrorKind, GeoError, GeoResult};
pub use crate::handle::{GeoDb, GEODB_MAGIC};
pub use crate::mode::CacheMode;
pub use crate::native::{GeoBackend, NativeDb, NativeError};
pub use crate::predicates::install;
pub use crate::record::{translate, GeoPair, GeoRecord, GeoValue};
pub use crate::vocab::{vocabulary, Vocabulary};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
