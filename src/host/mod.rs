//! Host runtime surface
//!
//! The pieces of a logic-programming host that the geolocation bridge talks
//! to: terms, garbage-collected blobs with lifecycle hooks, and the foreign
//! predicate table.

mod blob;
mod foreign;
mod term;

pub use blob::{Blob, BlobData, Symbol};
pub use foreign::{ForeignFn, ForeignPredicate, ForeignTable};
pub use term::{Atom, Functor, Term};
