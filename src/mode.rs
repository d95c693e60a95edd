//! Open modes
//!
//! A database is opened in exactly one cache mode, chosen by name. The names
//! form a closed set; anything else is a domain error.

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the database file is brought into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Read the file into memory on open
    #[default]
    Standard,
    /// Read the file into memory on open
    MemoryCache,
    /// Like `MemoryCache`, reloading when the file's modification time changes
    CheckCache,
    /// Read the file into memory on open
    IndexCache,
    /// Memory-map the file
    MmapCache,
}

impl CacheMode {
    /// Every mode, in code order
    pub const ALL: [CacheMode; 5] = [
        CacheMode::Standard,
        CacheMode::MemoryCache,
        CacheMode::CheckCache,
        CacheMode::IndexCache,
        CacheMode::MmapCache,
    ];

    /// Symbolic name accepted by [`CacheMode::resolve`]
    pub fn name(self) -> &'static str {
        match self {
            CacheMode::Standard => "standard",
            CacheMode::MemoryCache => "memory_cache",
            CacheMode::CheckCache => "check_cache",
            CacheMode::IndexCache => "index_cache",
            CacheMode::MmapCache => "mmap_cache",
        }
    }

    /// Stable numeric code, as exchanged with native callers
    pub fn code(self) -> u32 {
        match self {
            CacheMode::Standard => 0,
            CacheMode::MemoryCache => 1,
            CacheMode::CheckCache => 2,
            CacheMode::IndexCache => 4,
            CacheMode::MmapCache => 8,
        }
    }

    /// Resolve a mode by name
    ///
    /// Names are matched exactly; an unknown name is a `geoip_flags` domain
    /// error carrying the name.
    pub fn resolve(name: &str) -> GeoResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| GeoError::domain("geoip_flags", name))
    }

    /// Whether the file is memory-mapped instead of read
    pub fn is_mapped(self) -> bool {
        self == CacheMode::MmapCache
    }

    /// Whether the file is watched for changes between lookups
    pub fn reloads(self) -> bool {
        self == CacheMode::CheckCache
    }
}

impl FromStr for CacheMode {
    type Err = GeoError;

    fn from_str(s: &str) -> GeoResult<Self> {
        Self::resolve(s)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
