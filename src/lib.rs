//! geoip_ranges library: IP address to geolocation range resolution
//!
//! Every IPv4 or IPv6 address is normalized to a single unsigned 128-bit key
//! (IPv4 addresses are placed in the IPv4-mapped IPv6 space), and the key is
//! resolved against a table of inclusive numeric ranges, each carrying country,
//! region, city, coordinates, postal code and time zone.
//!
//! # Example
//!
//! ```
//! use geoip_ranges::normalize;
//!
//! let key = normalize("8.8.8.8")?;
//! assert_eq!(key.value(), 281_470_816_487_432);
//! assert_eq!(key, normalize("::ffff:8.8.8.8")?);
//! # Ok::<(), geoip_ranges::error_handling::AddressError>(())
//! ```
//!
//! Ranges live in SQLite (see [`import`] for loading the feed) and are served
//! either straight from the database or from an in-memory [`RangeSnapshot`].
//!
//! # Requirements
//!
//! Lookups, imports and the server require a Tokio runtime.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod error_handling;
pub mod geoip;
pub mod import;
pub mod initialization;
mod run;
pub mod server;
pub mod storage;

// Re-export public API
pub use config::{BackendKind, Config, LogFormat, LogLevel};
pub use geoip::{
    lookup, normalize, resolve, AddressKey, LookupResult, RangeRecord, RangeSnapshot,
    RangeSource, SnapshotHandle,
};
pub use run::{run_convert, run_import, run_lookup, run_server};
