//! IP range resolution engine.
//!
//! This module turns textual IPv4/IPv6 addresses into canonical 128-bit keys
//! and resolves them against a table of inclusive address ranges. It does no
//! I/O and no logging: ranges come from any `RangeSource` (an in-memory
//! snapshot or the SQLite store) and every failure is returned as a typed
//! error for the caller to report.

mod address;
mod resolve;
mod snapshot;
mod types;

// Re-export public API
pub use address::normalize;
pub use resolve::{lookup, resolve, select_best, RangeSource};
pub use snapshot::{RangeSnapshot, SnapshotHandle, SnapshotMetadata};
pub use types::{AddressKey, LookupResult, RangeRecord};

#[cfg(test)]
pub(crate) use types::test_record;
