//! Backing bytes of an open database
//!
//! Files ending in `.gz` (case-insensitive) are decompressed into memory on
//! load. Everything else is either read whole or memory-mapped.

use super::NativeError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffer size for reading compressed files
const BUFFER_SIZE: usize = 128 * 1024;

/// Database bytes, owned or mapped
pub enum DatabaseStorage {
    /// Read (and possibly decompressed) into memory
    Owned(Vec<u8>),
    /// Memory-mapped from the file
    Mmap(Mmap),
}

impl DatabaseStorage {
    /// Read the whole file into memory, decompressing `.gz` files
    pub fn load(path: &Path) -> Result<Self, NativeError> {
        let file = File::open(path)?;
        let mut data = Vec::new();
        if is_gzip(path) {
            let reader = BufReader::with_capacity(BUFFER_SIZE, file);
            GzDecoder::new(reader).read_to_end(&mut data)?;
        } else {
            BufReader::new(file).read_to_end(&mut data)?;
        }
        Ok(DatabaseStorage::Owned(data))
    }

    /// Memory-map the file
    ///
    /// A compressed file cannot be mapped and is rejected.
    pub fn map(path: &Path) -> Result<Self, NativeError> {
        if is_gzip(path) {
            return Err(NativeError::Unsupported(format!(
                "cannot memory-map compressed file {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        // SAFETY: the map is read-only; a database replaced on disk while
        // mapped is the caller's problem, same as for the native library.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(DatabaseStorage::Mmap(mmap))
    }

    /// Borrow the bytes
    pub fn as_slice(&self) -> &[u8] {
        match self {
            DatabaseStorage::Owned(v) => v.as_slice(),
            DatabaseStorage::Mmap(m) => &m[..],
        }
    }

    /// True for mapped storage
    pub fn is_mapped(&self) -> bool {
        matches!(self, DatabaseStorage::Mmap(_))
    }
}

impl AsRef<[u8]> for DatabaseStorage {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// True if `path` ends in `.gz`, ignoring case
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
