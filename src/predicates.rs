//! Foreign predicates over host terms
//!
//! | Predicate          | Arguments                          |
//! |--------------------|------------------------------------|
//! | `geoip_open/3`     | `+File, +Mode, -Handle`            |
//! | `geoip_close_/1`   | `+Handle`                          |
//! | `geoip_lookup_/3`  | `+Handle, +ip(A,B,C,D), -Pairs`    |
//!
//! `Pairs` is a list of `Key-Value` terms, empty if the address is not in the
//! database.

use crate::address;
use crate::error::{GeoError, GeoResult};
use crate::handle::{self, GeoDb, GEODB_TYPE};
use crate::host::{Blob, ForeignTable, Term};
use crate::record;

/// Register the geoip predicates in `table`
pub fn install(table: &mut ForeignTable) {
    crate::vocab::vocabulary();
    table.register("geoip_open", 3, geoip_open);
    table.register("geoip_close_", 1, geoip_close);
    table.register("geoip_lookup_", 3, geoip_lookup);
}

/// Resolve a handle argument to an open database
///
/// Not a geoip blob is a `geoip` type error; a closed one is a permission
/// error.
pub fn get_geodb(term: &Term) -> GeoResult<&GeoDb> {
    let blob = term
        .as_blob()
        .ok_or_else(|| GeoError::type_error(GEODB_TYPE, term))?;
    let db = handle::from_blob(blob, term)?;
    db.ensure_open()?;
    Ok(db)
}

/// `geoip_open(+File, +Mode, -Handle)`
fn geoip_open(args: &[Term]) -> GeoResult<Option<Term>> {
    let file = args[0]
        .text()
        .ok_or_else(|| GeoError::type_error("text", &args[0]))?;
    let mode = args[1]
        .as_atom()
        .ok_or_else(|| GeoError::type_error("atom", &args[1]))?;

    let db = GeoDb::open_named(file, mode.name())?;
    Ok(Some(Term::Blob(Blob::new(db))))
}

/// `geoip_close_(+Handle)`
fn geoip_close(args: &[Term]) -> GeoResult<Option<Term>> {
    get_geodb(&args[0])?.close()?;
    Ok(None)
}

/// `geoip_lookup_(+Handle, +Address, -Pairs)`
fn geoip_lookup(args: &[Term]) -> GeoResult<Option<Term>> {
    let db = get_geodb(&args[0])?;
    let ipnum = address::decode(&args[1])?
        .ok_or_else(|| GeoError::type_error("ipnum", &args[1]))?;

    let pairs = match db.record_by_ipnum(ipnum)? {
        Some(record) => record::translate(&record),
        None => Vec::new(),
    };
    Ok(Some(record::to_term(&pairs)))
}
