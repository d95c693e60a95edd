//! The geoip database handle
//!
//! A [`GeoDb`] owns at most one native database. Hosts hold it inside a
//! [`Blob`](crate::host::Blob), so it can outlive an explicit close: the slot
//! is emptied by [`GeoDb::close`] or, failing that, by the finalizer when the
//! last reference goes away. The native database is released exactly once
//! either way.

use crate::error::{GeoError, GeoResult};
use crate::host::{Blob, BlobData, Symbol};
use crate::mode::CacheMode;
use crate::native::{GeoBackend, NativeDb};
use crate::record::GeoRecord;
use parking_lot::RwLock;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::fs::{self, File};
use std::io::ErrorKind as IoErrorKind;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::OnceLock;

/// Tag carried by every live handle, checked where raw pointers come back in
pub const GEODB_MAGIC: u32 = 0x4745_4f42;

/// Blob type name, also the expected type in type errors
pub const GEODB_TYPE: &str = "geoip";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// An open (or closed) geoip database
pub struct GeoDb {
    magic: u32,
    id: u64,
    path: PathBuf,
    mode: CacheMode,
    symbol: OnceLock<Symbol>,
    native: RwLock<Option<Box<dyn GeoBackend>>>,
}

/// Check that `path` names an existing, readable regular file
pub fn check_source(path: &Path) -> GeoResult<()> {
    let culprit = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => GeoError::existence("source_sink", &culprit),
        _ => GeoError::permission("open", "source_sink", &culprit),
    })?;
    if !metadata.is_file() {
        return Err(GeoError::permission("open", "source_sink", &culprit));
    }
    File::open(path).map_err(|_| GeoError::permission("open", "source_sink", &culprit))?;
    Ok(())
}

impl GeoDb {
    /// Open `path` in `mode`
    ///
    /// # Errors
    ///
    /// - existence error if the file does not exist
    /// - permission error (`open`, `source_sink`) if it is not a readable file
    /// - permission error (`open`, `geoip`) if the engine rejects it
    pub fn open(path: impl AsRef<Path>, mode: CacheMode) -> GeoResult<Self> {
        let path = path.as_ref();
        check_source(path)?;
        Self::open_checked(path, mode)
    }

    /// Open `path` with the mode named `mode`
    ///
    /// The file is checked before the mode name.
    pub fn open_named(path: impl AsRef<Path>, mode: &str) -> GeoResult<Self> {
        let path = path.as_ref();
        check_source(path)?;
        Self::open_checked(path, CacheMode::resolve(mode)?)
    }

    fn open_checked(path: &Path, mode: CacheMode) -> GeoResult<Self> {
        let native = NativeDb::open(path, mode).map_err(|e| {
            tracing::debug!(path = %path.display(), mode = %mode, error = %e, "geoip open failed");
            GeoError::permission("open", "geoip", path.display())
        })?;

        let db = Self::with_backend(path.to_path_buf(), mode, Box::new(native));
        tracing::debug!(id = db.id, path = %path.display(), mode = %mode, "geoip handle opened");
        Ok(db)
    }

    /// Wrap an already open backend
    pub fn from_backend(backend: impl GeoBackend) -> Self {
        Self::with_backend(PathBuf::new(), CacheMode::Standard, Box::new(backend))
    }

    fn with_backend(path: PathBuf, mode: CacheMode, backend: Box<dyn GeoBackend>) -> Self {
        GeoDb {
            magic: GEODB_MAGIC,
            id: NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            path,
            mode,
            symbol: OnceLock::new(),
            native: RwLock::new(Some(backend)),
        }
    }

    /// Unique id of this handle
    pub fn id(&self) -> u64 {
        self.id
    }

    /// File the handle was opened from; empty for wrapped backends
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the handle was opened in
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Host symbol, once bound
    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol.get().copied()
    }

    /// True if the magic tag is intact
    pub fn is_valid(&self) -> bool {
        self.magic == GEODB_MAGIC
    }

    /// True until closed or finalized
    pub fn is_open(&self) -> bool {
        self.native.read().is_some()
    }

    /// Fail with a permission error if the handle is closed
    pub fn ensure_open(&self) -> GeoResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(self.closed_error())
        }
    }

    fn closed_error(&self) -> GeoError {
        GeoError::permission("access", "closed_geoip_database", self)
    }

    /// Release the native database, leaving the handle closed
    ///
    /// Closing twice is a permission error.
    pub fn close(&self) -> GeoResult<()> {
        debug_assert!(self.is_valid());
        match self.native.write().take() {
            Some(native) => {
                drop(native);
                tracing::debug!(id = self.id, "geoip handle closed");
                Ok(())
            }
            None => Err(self.closed_error()),
        }
    }

    /// Record for a packed address
    ///
    /// `Ok(None)` means the database has no entry for it.
    pub fn record_by_ipnum(&self, ipnum: u32) -> GeoResult<Option<GeoRecord>> {
        debug_assert!(self.is_valid());
        let slot = self.native.read();
        let native = slot.as_ref().ok_or_else(|| self.closed_error())?;
        tracing::trace!(id = self.id, ip = %Ipv4Addr::from(ipnum), "geoip lookup");
        native.record_by_ipnum(ipnum).map_err(|e| {
            tracing::debug!(id = self.id, error = %e, "geoip lookup failed");
            GeoError::permission("read", "geoip", self)
        })
    }

    /// Record for an address
    pub fn lookup(&self, addr: Ipv4Addr) -> GeoResult<Option<GeoRecord>> {
        self.record_by_ipnum(u32::from(addr))
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }
}

impl BlobData for GeoDb {
    fn type_name(&self) -> &'static str {
        GEODB_TYPE
    }

    fn acquire(&self, symbol: Symbol) {
        let _ = self.symbol.set(symbol);
    }

    fn release(&self) {
        if self.native.write().take().is_some() {
            tracing::warn!(id = self.id, "geoip handle finalized while still open");
        }
        tracing::debug!(id = self.id, "geoip handle released");
    }

    fn compare(&self, other: &dyn BlobData) -> Ordering {
        let other = other as *const dyn BlobData as *const () as usize;
        self.address().cmp(&other)
    }

    fn write(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "<geoip>({:p})", self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for GeoDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f)
    }
}

impl fmt::Debug for GeoDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoDb")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for GeoDb {
    fn drop(&mut self) {
        if self.native.get_mut().take().is_some() {
            tracing::debug!(id = self.id, "geoip handle dropped while open");
        }
        self.magic = 0;
    }
}

/// Borrow the [`GeoDb`] inside `blob`
///
/// A blob of another type is a `geoip` type error naming `culprit`.
pub fn from_blob<'a>(blob: &'a Blob, culprit: impl fmt::Display) -> GeoResult<&'a GeoDb> {
    let db = blob
        .downcast_ref::<GeoDb>()
        .ok_or_else(|| GeoError::type_error(GEODB_TYPE, culprit))?;
    debug_assert!(db.is_valid());
    Ok(db)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::native::NativeError;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Backend that answers one address and counts its lookups and drops
    pub(crate) struct FakeBackend {
        pub(crate) drops: Arc<AtomicUsize>,
        pub(crate) lookups: Arc<AtomicUsize>,
        pub(crate) known: u32,
    }

    impl FakeBackend {
        pub(crate) fn new(drops: &Arc<AtomicUsize>) -> Self {
            FakeBackend {
                drops: Arc::clone(drops),
                lookups: Arc::new(AtomicUsize::new(0)),
                known: u32::from(Ipv4Addr::new(8, 8, 8, 8)),
            }
        }
    }

    impl GeoBackend for FakeBackend {
        fn record_by_ipnum(&self, ipnum: u32) -> Result<Option<GeoRecord>, NativeError> {
            self.lookups.fetch_add(1, AtomicOrdering::SeqCst);
            if ipnum == self.known {
                Ok(Some(GeoRecord {
                    country_code: Some("US".into()),
                    country_code3: Some("USA".into()),
                    latitude: 37.751,
                    longitude: -97.822,
                    netmask: 24,
                    ..GeoRecord::default()
                }))
            } else if ipnum == u32::MAX {
                Err(NativeError::Unsupported("broadcast".into()))
            } else {
                Ok(None)
            }
        }
    }

    impl Drop for FakeBackend {
        fn drop(&mut self) {
            self.drops.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    fn fake() -> (GeoDb, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (GeoDb::from_backend(FakeBackend::new(&drops)), drops)
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let (db, _) = fake();
        let record = db.lookup(Ipv4Addr::new(8, 8, 8, 8)).unwrap().unwrap();
        assert_eq!(record.country_code.as_deref(), Some("US"));
        assert_eq!(db.lookup(Ipv4Addr::new(10, 0, 0, 1)).unwrap(), None);
    }

    #[test]
    fn test_engine_failure_is_read_permission_error() {
        let (db, _) = fake();
        let err = db.record_by_ipnum(u32::MAX).unwrap_err();
        assert_eq!(err, GeoError::permission("read", "geoip", &db));
        assert!(db.is_open());
    }

    #[test]
    fn test_close_releases_once() {
        let (db, drops) = fake();
        db.close().unwrap();
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
        assert!(!db.is_open());

        let err = db.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(err, GeoError::permission("access", "closed_geoip_database", &db));

        drop(db);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_lookup_after_close_is_permission_error() {
        let (db, _) = fake();
        db.close().unwrap();
        let err = db.lookup(Ipv4Addr::new(8, 8, 8, 8)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert!(db.ensure_open().is_err());
    }

    #[test]
    fn test_finalizer_releases_when_last_reference_drops() {
        let (db, drops) = fake();
        let blob = Blob::new(db);
        let copy = blob.clone();

        drop(blob);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 0);
        assert!(from_blob(&copy, "h").unwrap().is_open());

        drop(copy);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_close_then_finalize_releases_once() {
        let (db, drops) = fake();
        let blob = Blob::new(db);
        from_blob(&blob, "h").unwrap().close().unwrap();
        drop(blob);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_acquire_records_symbol() {
        let (db, _) = fake();
        assert_eq!(db.symbol(), None);
        let blob = Blob::new(db);
        assert_eq!(from_blob(&blob, "h").unwrap().symbol(), Some(blob.symbol()));
    }

    #[test]
    fn test_compare_is_identity() {
        let a = Blob::new(fake().0);
        let b = Blob::new(fake().0);

        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        assert_ne!(a, b);
    }

    #[test]
    fn test_write_shows_address_only() {
        let (db, _) = fake();
        let text = db.to_string();
        assert!(text.starts_with("<geoip>(0x"), "{}", text);
        assert!(text.ends_with(')'));

        let blob = Blob::new(db);
        let shown = blob.to_string();
        let inner = from_blob(&blob, "h").unwrap();
        assert_eq!(shown, format!("<geoip>({:p})", inner));
        inner.close().unwrap();
        assert_eq!(blob.to_string(), shown);
    }

    #[test]
    fn test_ids_are_unique() {
        let (a, _) = fake();
        let (b, _) = fake();
        assert_ne!(a.id(), b.id());
        assert!(a.is_valid());
    }

    #[test]
    fn test_open_missing_file_is_existence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GeoLiteCity.dat");
        let err = GeoDb::open(&path, CacheMode::Standard).unwrap_err();
        assert_eq!(err, GeoError::existence("source_sink", path.display()));
    }

    #[test]
    fn test_open_directory_is_permission_error() {
        let dir = TempDir::new().unwrap();
        let err = GeoDb::open(dir.path(), CacheMode::Standard).unwrap_err();
        assert_eq!(err, GeoError::permission("open", "source_sink", dir.path().display()));
    }

    #[test]
    fn test_open_garbage_is_geoip_permission_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.dat");
        std::fs::write(&path, b"junk").unwrap();
        let err = GeoDb::open(&path, CacheMode::MemoryCache).unwrap_err();
        assert_eq!(err, GeoError::permission("open", "geoip", path.display()));
    }

    #[test]
    fn test_open_named_checks_file_before_mode() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.dat");
        let err = GeoDb::open_named(&missing, "turbo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Existence);

        let present = dir.path().join("present.dat");
        std::fs::write(&present, b"junk").unwrap();
        let err = GeoDb::open_named(&present, "turbo").unwrap_err();
        assert_eq!(err, GeoError::domain("geoip_flags", "turbo"));

        let err = GeoDb::open_named(&present, "standard").unwrap_err();
        assert_eq!(err, GeoError::permission("open", "geoip", present.display()));
        let err = GeoDb::open_named(dir.path(), "standard").unwrap_err();
        assert_eq!(err, GeoError::permission("open", "source_sink", dir.path().display()));
    }

    #[test]
    fn test_from_blob_rejects_other_types() {
        struct Other;
        impl BlobData for Other {
            fn type_name(&self) -> &'static str {
                "other"
            }
            fn compare(&self, _: &dyn BlobData) -> Ordering {
                Ordering::Equal
            }
            fn write(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
                out.write_str("<other>")
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let blob = Blob::new(Other);
        let err = from_blob(&blob, &blob).unwrap_err();
        assert_eq!(err, GeoError::type_error("geoip", "<other>"));
    }
}
