//! IPv4 address decoding
//!
//! Addresses arrive from the host as `ip(A,B,C,D)`. Each component is checked
//! on its own, left to right, and the first bad one is reported. The packed
//! key has the first component in the most significant octet.

use crate::error::{GeoError, GeoResult};
use crate::host::Term;
use crate::vocab::vocabulary;
use std::fmt;
use std::net::Ipv4Addr;

/// Pack four octets, most significant first
pub fn pack(octets: [u8; 4]) -> u32 {
    u32::from_be_bytes(octets)
}

fn component(value: i64, culprit: impl fmt::Display) -> GeoResult<u8> {
    u8::try_from(value).map_err(|_| GeoError::domain("ip4_component", culprit))
}

/// Validate and pack four integer components
///
/// Any component outside `0..=255` is an `ip4_component` domain error naming
/// that component.
pub fn pack_components(components: [i64; 4]) -> GeoResult<u32> {
    let mut octets = [0u8; 4];
    for (octet, value) in octets.iter_mut().zip(components) {
        *octet = component(value, value)?;
    }
    Ok(pack(octets))
}

/// Decode an `ip(A,B,C,D)` term into a packed address
///
/// Returns `Ok(None)` when the term is not an `ip/4` structure at all, so the
/// caller can report the whole term. A component that is not an integer is a
/// type error; one outside `0..=255` is a domain error.
pub fn decode(term: &Term) -> GeoResult<Option<u32>> {
    let args = match term.args_of(&vocabulary().ip4) {
        Some(args) => args,
        None => return Ok(None),
    };

    let mut octets = [0u8; 4];
    for (octet, arg) in octets.iter_mut().zip(args) {
        let value = arg
            .as_integer()
            .ok_or_else(|| GeoError::type_error("integer", arg))?;
        *octet = component(value, arg)?;
    }
    Ok(Some(pack(octets)))
}

/// Build the `ip(A,B,C,D)` term for an address
pub fn to_term(addr: Ipv4Addr) -> Term {
    Term::Compound {
        name: vocabulary().ip4.name().clone(),
        args: addr.octets().iter().map(|&o| Term::Integer(i64::from(o))).collect(),
    }
}
