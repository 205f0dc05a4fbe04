//! Configuration constants.
//!
//! This module defines the constants used throughout the application: the
//! IPv4-mapped address base, server defaults, and feed/import parameters.

/// Integer value of `::ffff:0.0.0.0`.
///
/// Added to a 32-bit IPv4 value to place it in the IPv4-mapped IPv6 range,
/// which is how the range feed keys every IPv4 block.
pub const IPV4_MAPPED_BASE: u128 = 0xffff_0000_0000;

/// Default SQLite database path
pub const DB_PATH: &str = "./geoip_ranges.db";

/// Default address the lookup server binds to
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port for the lookup server
pub const DEFAULT_PORT: u16 = 9926;

/// Path of the lookup endpoint (`GET /GeoIPLookup?ip=...`)
pub const LOOKUP_PATH: &str = "/GeoIPLookup";

/// Sentinel the feed uses for unknown text attributes
pub const PLACEHOLDER: &str = "-";

/// Number of rows written per `INSERT` statement during import.
/// 10 columns per row keeps each statement far below SQLite's bound-variable limit.
pub const IMPORT_BATCH_SIZE: usize = 500;

/// Log import progress every N feed rows
pub const IMPORT_PROGRESS_INTERVAL: usize = 10_000;

/// Width of a zero-padded decimal `u128` (`u128::MAX` has 39 digits).
/// Keys stored at this width sort the same as text and as integers.
pub const KEY_TEXT_WIDTH: usize = 39;

/// Column order of the range feed, also used as the header of converted files
pub const FEED_COLUMNS: [&str; 10] = [
    "ipFrom",
    "ipTo",
    "countryCode",
    "countryName",
    "regionName",
    "cityName",
    "latitude",
    "longitude",
    "zipCode",
    "timeZone",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_base_matches_decimal_value() {
        assert_eq!(IPV4_MAPPED_BASE, 281_470_681_743_360);
    }

    #[test]
    fn test_key_width_fits_u128_max() {
        assert_eq!(u128::MAX.to_string().len(), KEY_TEXT_WIDTH);
    }
}
