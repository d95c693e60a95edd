//! Geolocation records and their translation into host results
//!
//! A [`GeoRecord`] has a fixed shape. Translation walks the fields in a fixed
//! order and drops the ones that carry no information: empty strings and zero
//! integer codes. Latitude and longitude have no "absent" value and are always
//! emitted.

use crate::host::{Atom, Term};
use crate::vocab::vocabulary;
use serde::Serialize;
use std::fmt;

/// One lookup result, as produced by the native adapter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoRecord {
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    /// ISO 3166-1 alpha-3 country code
    pub country_code3: Option<String>,
    /// English country name
    pub country_name: Option<String>,
    /// Region (first subdivision) code
    pub region: Option<String>,
    /// English city name
    pub city: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Two-letter continent code
    pub continent_code: Option<String>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Prefix length of the matched network, 0 if unknown
    pub netmask: i32,
    /// Telephone area code, 0 if unknown
    pub area_code: i32,
    /// Metro (DMA) code, 0 if unknown
    pub dma_code: i32,
}

/// A typed result value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoValue {
    /// Text field
    Str(String),
    /// Coordinate
    Float(f64),
    /// Integer code
    Int(i64),
}

impl GeoValue {
    /// Host term for this value; text becomes a string object
    pub fn to_term(&self) -> Term {
        match self {
            GeoValue::Str(s) => Term::String(s.clone()),
            GeoValue::Float(x) => Term::Float(*x),
            GeoValue::Int(i) => Term::Integer(*i),
        }
    }
}

impl fmt::Display for GeoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoValue::Str(s) => write!(f, "{:?}", s),
            GeoValue::Float(x) => write!(f, "{:?}", x),
            GeoValue::Int(i) => write!(f, "{}", i),
        }
    }
}

/// A field name with its value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPair {
    /// Field name
    pub key: Atom,
    /// Field value
    pub value: GeoValue,
}

impl GeoPair {
    fn new(key: &Atom, value: GeoValue) -> Self {
        GeoPair {
            key: key.clone(),
            value,
        }
    }

    /// `Key-Value` term
    pub fn to_term(&self) -> Term {
        Term::Compound {
            name: vocabulary().pair.name().clone(),
            args: vec![Term::Atom(self.key.clone()), self.value.to_term()],
        }
    }
}

/// Translate a record into its ordered key/value pairs
///
/// Order: country_code, country_code3, country_name, region, city,
/// postal_code, continent_code, latitude, longitude, netmask, area_code.
/// `dma_code` is never emitted.
pub fn translate(record: &GeoRecord) -> Vec<GeoPair> {
    let v = vocabulary();
    let mut pairs = Vec::with_capacity(11);

    let strings = [
        (&v.country_code, &record.country_code),
        (&v.country_code3, &record.country_code3),
        (&v.country_name, &record.country_name),
        (&v.region, &record.region),
        (&v.city, &record.city),
        (&v.postal_code, &record.postal_code),
        (&v.continent_code, &record.continent_code),
    ];
    for (key, value) in strings {
        if let Some(text) = value.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(GeoPair::new(key, GeoValue::Str(text.to_owned())));
        }
    }

    pairs.push(GeoPair::new(&v.latitude, GeoValue::Float(record.latitude)));
    pairs.push(GeoPair::new(&v.longitude, GeoValue::Float(record.longitude)));

    for (key, value) in [(&v.netmask, record.netmask), (&v.area_code, record.area_code)] {
        if value != 0 {
            pairs.push(GeoPair::new(key, GeoValue::Int(i64::from(value))));
        }
    }

    pairs
}

/// Host list of `Key-Value` pairs
pub fn to_term(pairs: &[GeoPair]) -> Term {
    Term::List(pairs.iter().map(GeoPair::to_term).collect())
}
