//! Process-wide symbol tables
//!
//! Field-name atoms and the functors used to read addresses and build result
//! pairs. They are created once, on first use, and never change afterwards.

use crate::host::{Atom, Functor};
use std::sync::OnceLock;

/// Atoms and functors shared by every handle
#[derive(Debug)]
pub struct Vocabulary {
    /// `country_code`
    pub country_code: Atom,
    /// `country_code3`
    pub country_code3: Atom,
    /// `country_name`
    pub country_name: Atom,
    /// `region`
    pub region: Atom,
    /// `city`
    pub city: Atom,
    /// `postal_code`
    pub postal_code: Atom,
    /// `latitude`
    pub latitude: Atom,
    /// `longitude`
    pub longitude: Atom,
    /// `dma_code`; part of the vocabulary, never emitted in results
    pub dma_code: Atom,
    /// `area_code`
    pub area_code: Atom,
    /// `continent_code`
    pub continent_code: Atom,
    /// `netmask`
    pub netmask: Atom,
    /// `ip/4`, the address structure
    pub ip4: Functor,
    /// `-/2`, the key/value pair
    pub pair: Functor,
}

impl Vocabulary {
    fn new() -> Self {
        tracing::debug!("initialising geoip vocabulary");
        Vocabulary {
            country_code: Atom::new("country_code"),
            country_code3: Atom::new("country_code3"),
            country_name: Atom::new("country_name"),
            region: Atom::new("region"),
            city: Atom::new("city"),
            postal_code: Atom::new("postal_code"),
            latitude: Atom::new("latitude"),
            longitude: Atom::new("longitude"),
            dma_code: Atom::new("dma_code"),
            area_code: Atom::new("area_code"),
            continent_code: Atom::new("continent_code"),
            netmask: Atom::new("netmask"),
            ip4: Functor::new("ip", 4),
            pair: Functor::new("-", 2),
        }
    }
}

static VOCABULARY: OnceLock<Vocabulary> = OnceLock::new();

/// The shared vocabulary, created on first call
pub fn vocabulary() -> &'static Vocabulary {
    VOCABULARY.get_or_init(Vocabulary::new)
}
