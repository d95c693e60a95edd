//! Native geolocation engine
//!
//! Wraps a MaxMind DB reader over [`DatabaseStorage`]. The cache mode decides
//! how the file is brought into memory and whether it is watched for changes.
//! Everything above this module only sees [`GeoBackend`].

mod city;
mod iso3166;
pub mod storage;

pub use iso3166::alpha3;
pub use storage::DatabaseStorage;

use crate::mode::CacheMode;
use crate::record::GeoRecord;
use city::CityRecord;
use maxminddb::{MaxMindDbError, Reader};
use parking_lot::RwLock;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised by the native engine
#[derive(Debug, Error)]
pub enum NativeError {
    /// The file could not be read or mapped
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a usable database, or a record failed to decode
    #[error("Database error: {0}")]
    Engine(#[from] MaxMindDbError),

    /// The requested mode cannot be used with this file
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// A source of geolocation records keyed by packed IPv4 address
pub trait GeoBackend: Send + Sync + 'static {
    /// Record for `ipnum`, or `None` if the database has no entry
    fn record_by_ipnum(&self, ipnum: u32) -> Result<Option<GeoRecord>, NativeError>;
}

struct Loaded {
    reader: Reader<DatabaseStorage>,
    /// Modification time the last load attempt saw
    modified: Option<SystemTime>,
}

/// An open database file
pub struct NativeDb {
    path: PathBuf,
    mode: CacheMode,
    loaded: RwLock<Loaded>,
}

impl NativeDb {
    /// Open `path` in `mode`
    ///
    /// `mmap_cache` on a `.gz` file is rejected with
    /// [`NativeError::Unsupported`].
    pub fn open(path: impl AsRef<Path>, mode: CacheMode) -> Result<Self, NativeError> {
        let path = path.as_ref().to_path_buf();
        let modified = modified_time(&path);
        let reader = load_reader(&path, mode)?;
        tracing::debug!(
            path = %path.display(),
            mode = %mode,
            database_type = %reader.metadata.database_type,
            nodes = reader.metadata.node_count,
            mapped = mode.is_mapped(),
            "opened geoip database"
        );
        Ok(NativeDb {
            path,
            mode,
            loaded: RwLock::new(Loaded { reader, modified }),
        })
    }

    /// Open an in-memory database image
    ///
    /// Behaves like `memory_cache` with no file behind it.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, NativeError> {
        let reader = Reader::from_source(DatabaseStorage::Owned(data))?;
        Ok(NativeDb {
            path: PathBuf::new(),
            mode: CacheMode::MemoryCache,
            loaded: RwLock::new(Loaded {
                reader,
                modified: None,
            }),
        })
    }

    /// Path the database was opened from; empty for in-memory images
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the database was opened in
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Reload the file if its modification time changed since the last load
    ///
    /// A failed reload keeps serving the previous contents. Returns true if
    /// new contents were loaded.
    pub fn refresh(&self) -> bool {
        let current = modified_time(&self.path);
        if self.loaded.read().modified == current {
            return false;
        }

        let mut loaded = self.loaded.write();
        if loaded.modified == current {
            return false;
        }
        loaded.modified = current;
        match load_reader(&self.path, self.mode) {
            Ok(reader) => {
                tracing::debug!(path = %self.path.display(), "reloaded changed geoip database");
                loaded.reader = reader;
                true
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to reload geoip database, keeping previous contents"
                );
                false
            }
        }
    }
}

impl GeoBackend for NativeDb {
    fn record_by_ipnum(&self, ipnum: u32) -> Result<Option<GeoRecord>, NativeError> {
        if self.mode.reloads() {
            self.refresh();
        }

        let addr = IpAddr::V4(Ipv4Addr::from(ipnum));
        let loaded = self.loaded.read();
        let (city, prefix_len) = loaded.reader.lookup_prefix::<CityRecord>(addr)?;
        Ok(city.map(|city| city.into_record(prefix_len)))
    }
}

fn load_reader(path: &Path, mode: CacheMode) -> Result<Reader<DatabaseStorage>, NativeError> {
    let storage = if mode.is_mapped() {
        DatabaseStorage::map(path)?
    } else {
        DatabaseStorage::load(path)?
    };
    Ok(Reader::from_source(storage)?)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
