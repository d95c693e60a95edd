//! Test fixtures: a minimal MaxMind DB writer
//!
//! Writes IPv4-only databases with 24-bit records, enough to give the real
//! reader something to open. Networks must not nest.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::path::Path;
use std::time::{Duration, SystemTime};

const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

/// A value in the data section
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Double(f64),
    U16(u16),
    U32(u32),
    U64(u64),
    Map(Vec<(String, Value)>),
    Array(Vec<Value>),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(s.to_string())
    }

    pub fn map(entries: Vec<(&str, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Str(s) => {
                control(out, 2, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Value::Double(x) => {
                control(out, 3, 8);
                out.extend_from_slice(&x.to_be_bytes());
            }
            Value::U16(n) => unsigned(out, 5, u64::from(*n)),
            Value::U32(n) => unsigned(out, 6, u64::from(*n)),
            Value::U64(n) => unsigned(out, 9, *n),
            Value::Map(entries) => {
                control(out, 7, entries.len());
                for (key, value) in entries {
                    Value::Str(key.clone()).encode(out);
                    value.encode(out);
                }
            }
            Value::Array(items) => {
                control(out, 11, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

fn control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    let (size_bits, extra): (u8, Vec<u8>) = if size < 29 {
        (size as u8, vec![])
    } else if size < 285 {
        (29, vec![(size - 29) as u8])
    } else if size < 65_821 {
        (30, ((size - 285) as u16).to_be_bytes().to_vec())
    } else {
        (31, ((size - 65_821) as u32).to_be_bytes()[1..].to_vec())
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&extra);
}

fn unsigned(out: &mut Vec<u8>, type_num: u8, n: u64) {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    control(out, type_num, 8 - skip);
    out.extend_from_slice(&bytes[skip..]);
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Empty,
    Node(u32),
    Data(u32),
}

/// MaxMind DB writer for IPv4 networks
///
/// An IPv6 writer places every network under `::/96`, the way GeoLite2
/// files carry IPv4 data.
pub struct MmdbWriter {
    nodes: Vec<[Slot; 2]>,
    data: Vec<u8>,
    ip_version: u16,
}

impl Default for MmdbWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MmdbWriter {
    pub fn new() -> Self {
        MmdbWriter {
            nodes: vec![[Slot::Empty; 2]],
            data: Vec::new(),
            ip_version: 4,
        }
    }

    pub fn new_ipv6() -> Self {
        MmdbWriter {
            ip_version: 6,
            ..Self::new()
        }
    }

    /// Map `network/prefix_len` to `value`
    pub fn insert(&mut self, network: Ipv4Addr, prefix_len: u8, value: &Value) {
        assert!((1..=32).contains(&prefix_len));
        let offset = self.data.len() as u32;
        value.encode(&mut self.data);

        let bits = u32::from(network);
        let lead = if self.ip_version == 6 { 96 } else { 0 };
        let total = lead + usize::from(prefix_len);
        let mut node = 0usize;
        for depth in 0..total {
            let bit = match depth.checked_sub(lead) {
                Some(i) => ((bits >> (31 - i)) & 1) as usize,
                None => 0,
            };
            if depth + 1 == total {
                self.nodes[node][bit] = Slot::Data(offset);
                break;
            }
            node = match self.nodes[node][bit] {
                Slot::Node(next) => next as usize,
                _ => {
                    let next = self.nodes.len();
                    self.nodes.push([Slot::Empty; 2]);
                    self.nodes[node][bit] = Slot::Node(next as u32);
                    next
                }
            };
        }
    }

    /// Serialize the database
    pub fn to_bytes(&self) -> Vec<u8> {
        let node_count = self.nodes.len() as u32;
        let mut out = Vec::new();

        for node in &self.nodes {
            for slot in node {
                let record = match *slot {
                    Slot::Empty => node_count,
                    Slot::Node(n) => n,
                    Slot::Data(offset) => node_count + 16 + offset,
                };
                out.extend_from_slice(&record.to_be_bytes()[1..]);
            }
        }

        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(METADATA_MARKER);

        let metadata = Value::map(vec![
            ("binary_format_major_version", Value::U16(2)),
            ("binary_format_minor_version", Value::U16(0)),
            ("build_epoch", Value::U64(1_700_000_000)),
            ("database_type", Value::str("GeoLite2-City")),
            ("description", Value::map(vec![("en", Value::str("geoblob test fixture"))])),
            ("ip_version", Value::U16(self.ip_version)),
            ("languages", Value::Array(vec![Value::str("en")])),
            ("node_count", Value::U32(node_count)),
            ("record_size", Value::U16(24)),
        ]);
        metadata.encode(&mut out);
        out
    }

    /// Write the database to `path`
    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }
}

/// A GeoIP2 City-shaped record
pub struct City<'a> {
    pub iso_code: &'a str,
    pub country: &'a str,
    pub continent: &'a str,
    pub region: Option<&'a str>,
    pub city: Option<&'a str>,
    pub postal: Option<&'a str>,
    pub latitude: f64,
    pub longitude: f64,
    pub metro_code: Option<u16>,
}

impl City<'_> {
    pub fn to_value(&self) -> Value {
        let mut location = vec![
            ("latitude", Value::Double(self.latitude)),
            ("longitude", Value::Double(self.longitude)),
        ];
        if let Some(metro) = self.metro_code {
            location.push(("metro_code", Value::U16(metro)));
        }

        let mut entries = vec![
            ("continent", Value::map(vec![("code", Value::str(self.continent))])),
            (
                "country",
                Value::map(vec![
                    ("iso_code", Value::str(self.iso_code)),
                    ("names", Value::map(vec![("en", Value::str(self.country))])),
                ]),
            ),
            ("location", Value::map(location)),
        ];
        if let Some(city) = self.city {
            entries.push((
                "city",
                Value::map(vec![("names", Value::map(vec![("en", Value::str(city))]))]),
            ));
        }
        if let Some(postal) = self.postal {
            entries.push(("postal", Value::map(vec![("code", Value::str(postal))])));
        }
        if let Some(region) = self.region {
            entries.push((
                "subdivisions",
                Value::Array(vec![Value::map(vec![("iso_code", Value::str(region))])]),
            ));
        }
        Value::map(entries)
    }
}

pub const MOUNTAIN_VIEW: City<'static> = City {
    iso_code: "US",
    country: "United States",
    continent: "NA",
    region: Some("CA"),
    city: Some("Mountain View"),
    postal: Some("94035"),
    latitude: 37.386,
    longitude: -122.0838,
    metro_code: Some(807),
};

pub const LONDON: City<'static> = City {
    iso_code: "GB",
    country: "United Kingdom",
    continent: "EU",
    region: Some("ENG"),
    city: Some("London"),
    postal: Some("EC2V"),
    latitude: 51.5142,
    longitude: -0.0931,
    metro_code: None,
};

pub const AUSTRALIA: City<'static> = City {
    iso_code: "AU",
    country: "Australia",
    continent: "OC",
    region: None,
    city: None,
    postal: None,
    latitude: -33.494,
    longitude: 143.2104,
    metro_code: None,
};

/// The standard fixture: 8.8.8.0/24, 81.2.69.0/24 and 1.1.1.0/24
pub fn city_db() -> MmdbWriter {
    with_cities(MmdbWriter::new())
}

/// The standard fixture in an IPv6 tree
pub fn city_db_ipv6() -> MmdbWriter {
    with_cities(MmdbWriter::new_ipv6())
}

fn with_cities(mut writer: MmdbWriter) -> MmdbWriter {
    writer.insert(Ipv4Addr::new(8, 8, 8, 0), 24, &MOUNTAIN_VIEW.to_value());
    writer.insert(Ipv4Addr::new(81, 2, 69, 0), 24, &LONDON.to_value());
    writer.insert(Ipv4Addr::new(1, 1, 1, 0), 24, &AUSTRALIA.to_value());
    writer
}

/// Write the standard fixture to `dir/name`
pub fn write_city_db(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    city_db().write_to(&path);
    path
}

/// Push the file's modification time a minute into the future
pub fn touch_later(path: &Path) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
}

/// Install a test-friendly subscriber once; `RUST_LOG` controls the filter
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
