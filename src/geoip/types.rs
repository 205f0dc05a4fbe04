//! GeoIP data structures.
//!
//! This module defines the canonical address key, the range record and the
//! lookup result returned to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::config::{KEY_TEXT_WIDTH, PLACEHOLDER};

/// Canonical unsigned 128-bit key of an IP address.
///
/// IPv4 addresses live in the IPv4-mapped IPv6 range, so `8.8.8.8` and
/// `::ffff:8.8.8.8` share one key. Serialized as a decimal string because
/// JSON consumers cannot represent 128-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AddressKey(u128);

impl AddressKey {
    /// Smallest key (`::`)
    pub const MIN: AddressKey = AddressKey(0);
    /// Largest key (`ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff`)
    pub const MAX: AddressKey = AddressKey(u128::MAX);

    /// Key with the given numeric value
    pub const fn new(value: u128) -> Self {
        AddressKey(value)
    }

    /// Numeric value of the key
    pub const fn value(self) -> u128 {
        self.0
    }

    /// Zero-padded decimal form; text order equals numeric order.
    pub fn to_padded(self) -> String {
        format!("{:0width$}", self.0, width = KEY_TEXT_WIDTH)
    }
}

impl From<u128> for AddressKey {
    fn from(value: u128) -> Self {
        AddressKey(value)
    }
}

impl From<AddressKey> for u128 {
    fn from(key: AddressKey) -> Self {
        key.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AddressKey {
    type Err = std::num::ParseIntError;

    /// Parses a decimal key, with or without zero padding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(AddressKey)
    }
}

impl Serialize for AddressKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// One contiguous block of address space sharing geographic attributes.
///
/// Bounds are inclusive and `ip_from <= ip_to` holds for every record built
/// by the import step. Text attributes use `"-"` for unknown values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRecord {
    /// First key of the range
    pub ip_from: AddressKey,
    /// Last key of the range (inclusive)
    pub ip_to: AddressKey,
    /// ISO 3166-1 alpha-2 code
    pub country_code: String,
    /// Country name
    pub country_name: String,
    /// Region or state name
    pub region_name: String,
    /// City name
    pub city_name: String,
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    /// Postal code
    pub zip_code: String,
    /// UTC offset such as `-07:00`
    pub time_zone: String,
}

impl RangeRecord {
    /// Whether `key` falls inside this range (bounds inclusive).
    pub fn contains(&self, key: AddressKey) -> bool {
        self.ip_from <= key && key <= self.ip_to
    }

    /// Whether this row carries no usable location.
    ///
    /// Every text attribute is the `"-"` sentinel and both coordinates are
    /// exactly zero. A row with any real attribute is kept.
    pub fn is_placeholder(&self) -> bool {
        [
            &self.country_code,
            &self.country_name,
            &self.region_name,
            &self.city_name,
            &self.zip_code,
            &self.time_zone,
        ]
        .iter()
        .all(|field| field.as_str() == PLACEHOLDER)
            && self.latitude == 0.0
            && self.longitude == 0.0
    }
}

/// Result of looking up one address.
///
/// Serializes as `{ "ip": ..., "found": ..., "result": <record or null> }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    /// The address as the client wrote it
    #[serde(rename = "ip")]
    pub queried_address: String,
    /// Whether a covering range was found
    pub found: bool,
    /// The selected range, if any
    #[serde(rename = "result")]
    pub record: Option<RangeRecord>,
}

impl LookupResult {
    /// Result for `queried_address`; `found` follows from `record`.
    pub fn new(queried_address: impl Into<String>, record: Option<RangeRecord>) -> Self {
        LookupResult {
            queried_address: queried_address.into(),
            found: record.is_some(),
            record,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_record(from: u128, to: u128, city: &str) -> RangeRecord {
    RangeRecord {
        ip_from: AddressKey::new(from),
        ip_to: AddressKey::new(to),
        country_code: "US".to_string(),
        country_name: "United States of America".to_string(),
        region_name: "California".to_string(),
        city_name: city.to_string(),
        latitude: 37.386051,
        longitude: -122.083847,
        zip_code: "94035".to_string(),
        time_zone: "-07:00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(from: u128, to: u128) -> RangeRecord {
        RangeRecord {
            ip_from: AddressKey::new(from),
            ip_to: AddressKey::new(to),
            country_code: "-".to_string(),
            country_name: "-".to_string(),
            region_name: "-".to_string(),
            city_name: "-".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            zip_code: "-".to_string(),
            time_zone: "-".to_string(),
        }
    }

    #[test]
    fn test_key_padding_preserves_order() {
        let small = AddressKey::new(9);
        let large = AddressKey::new(10);
        assert!(small.to_padded() < large.to_padded());
        assert_eq!(AddressKey::MAX.to_padded(), u128::MAX.to_string());
        assert_eq!(AddressKey::MIN.to_padded().len(), 39);
    }

    #[test]
    fn test_key_parses_padded_and_plain() {
        let key: AddressKey = "000000000000000000000000281470681743360".parse().unwrap();
        assert_eq!(key.value(), 281470681743360);
        let key: AddressKey = "281470681743360".parse().unwrap();
        assert_eq!(key.value(), 281470681743360);
        assert!("-1".parse::<AddressKey>().is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let record = test_record(100, 200, "Mountain View");
        assert!(record.contains(AddressKey::new(100)));
        assert!(record.contains(AddressKey::new(200)));
        assert!(!record.contains(AddressKey::new(99)));
        assert!(!record.contains(AddressKey::new(201)));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(placeholder(0, 10).is_placeholder());

        let mut real_country = placeholder(0, 10);
        real_country.country_code = "US".to_string();
        assert!(!real_country.is_placeholder());

        let mut real_coords = placeholder(0, 10);
        real_coords.latitude = 1.5;
        assert!(!real_coords.is_placeholder());
    }

    #[test]
    fn test_lookup_result_json_shape() {
        let result = LookupResult::new("8.8.8.8", Some(test_record(1, 2, "Mountain View")));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ip"], "8.8.8.8");
        assert_eq!(json["found"], true);
        assert_eq!(json["result"]["ipFrom"], "1");
        assert_eq!(json["result"]["ipTo"], "2");
        assert_eq!(json["result"]["cityName"], "Mountain View");
        assert_eq!(json["result"]["timeZone"], "-07:00");

        let empty = serde_json::to_value(LookupResult::new("::1", None)).unwrap();
        assert_eq!(empty["found"], false);
        assert!(empty["result"].is_null());
    }
}
