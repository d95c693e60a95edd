//! Garbage-collected opaque values
//!
//! A [`Blob`] is how a host holds on to native state it cannot inspect. The
//! host reference-counts blobs; when the last reference goes away it runs the
//! blob type's `release` hook and frees the backing storage. The remaining
//! hooks let the host order blobs (`compare`), print them (`write`) and tell
//! the data which symbol it has been bound to (`acquire`).

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Host symbol a blob is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u64);

impl Symbol {
    fn next() -> Self {
        Symbol(NEXT_SYMBOL.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Numeric value of the symbol
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Lifecycle hooks of a blob type
///
/// Implementors are the data stored inside a [`Blob`].
pub trait BlobData: Any + Send + Sync {
    /// Name of the blob type, also used as the type-error name
    fn type_name(&self) -> &'static str;

    /// Called once, right after the blob is registered under `symbol`
    fn acquire(&self, _symbol: Symbol) {}

    /// Called once, when the host drops the last reference
    fn release(&self) {}

    /// Order two blobs of the same type
    fn compare(&self, other: &dyn BlobData) -> Ordering;

    /// Diagnostic representation used when the host prints the blob
    fn write(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Upcast for [`Blob::downcast_ref`]
    fn as_any(&self) -> &dyn Any;
}

struct BlobCell {
    symbol: Symbol,
    data: Box<dyn BlobData>,
}

impl Drop for BlobCell {
    fn drop(&mut self) {
        self.data.release();
    }
}

/// Reference-counted handle to host-managed opaque data
#[derive(Clone)]
pub struct Blob {
    cell: Arc<BlobCell>,
}

impl Blob {
    /// Register `data` with the host and return the first reference to it
    pub fn new<T: BlobData>(data: T) -> Self {
        let cell = Arc::new(BlobCell {
            symbol: Symbol::next(),
            data: Box::new(data),
        });
        cell.data.acquire(cell.symbol);
        Blob { cell }
    }

    /// Symbol the blob is registered under
    pub fn symbol(&self) -> Symbol {
        self.cell.symbol
    }

    /// Name of the blob's type
    pub fn type_name(&self) -> &'static str {
        self.cell.data.type_name()
    }

    /// Borrow the data if it is a `T`
    pub fn downcast_ref<T: BlobData>(&self) -> Option<&T> {
        self.cell.data.as_any().downcast_ref::<T>()
    }

    /// Number of live references, including this one
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Eq for Blob {}

impl PartialOrd for Blob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Blob {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.cell, &other.cell) {
            return Ordering::Equal;
        }
        match self.type_name().cmp(other.type_name()) {
            Ordering::Equal => self.cell.data.compare(other.cell.data.as_ref()),
            unequal => unequal,
        }
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cell.data.write(f)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("type", &self.type_name())
            .field("symbol", &self.symbol())
            .finish()
    }
}
