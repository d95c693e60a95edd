//! GeoIP2 City record layout and its projection onto [`GeoRecord`]
//!
//! Only the fields a [`GeoRecord`] needs are decoded. Everything is optional
//! in the database, so every field defaults.

use super::iso3166;
use crate::record::GeoRecord;
use serde::Deserialize;
use std::collections::BTreeMap;

const LANGUAGE: &str = "en";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CityRecord {
    pub city: Names,
    pub continent: Continent,
    pub country: Country,
    pub location: Location,
    pub postal: Postal,
    pub subdivisions: Vec<Subdivision>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Names {
    pub names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Continent {
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Country {
    pub iso_code: Option<String>,
    pub names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metro_code: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Postal {
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Subdivision {
    pub iso_code: Option<String>,
}

impl CityRecord {
    /// Project onto the fixed record shape
    ///
    /// `prefix_len` is the length of the matched network. GeoIP2 carries no
    /// telephone area codes, so `area_code` is always 0.
    pub fn into_record(mut self, prefix_len: usize) -> GeoRecord {
        let country_code3 = self
            .country
            .iso_code
            .as_deref()
            .and_then(iso3166::alpha3)
            .map(str::to_owned);
        let region = self
            .subdivisions
            .into_iter()
            .next()
            .and_then(|s| s.iso_code);

        GeoRecord {
            country_code3,
            country_code: self.country.iso_code,
            country_name: self.country.names.remove(LANGUAGE),
            region,
            city: self.city.names.remove(LANGUAGE),
            postal_code: self.postal.code,
            continent_code: self.continent.code,
            latitude: self.location.latitude.unwrap_or(0.0),
            longitude: self.location.longitude.unwrap_or(0.0),
            netmask: i32::try_from(prefix_len).unwrap_or(0),
            area_code: 0,
            dma_code: self.location.metro_code.map(i32::from).unwrap_or(0),
        }
    }
}
