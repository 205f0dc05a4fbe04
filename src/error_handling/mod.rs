//! Error handling and lookup statistics.
//!
//! This module provides:
//! - Error type definitions for every layer (address parsing, range sources,
//!   resolution, storage, import, initialization, configuration)
//! - Lookup outcome categories and thread-safe counters for them
//!
//! Outcomes are categorized into:
//! - **Results**: a range was found, or legitimately none covers the address
//! - **Client errors**: the address is malformed or missing
//! - **Server errors**: the range source failed

mod stats;
mod types;

// Re-export public API
pub use stats::LookupStats;
pub use types::{
    AddressError, ConfigValidationError, DatabaseError, ImportError, InitializationError,
    LookupError, LookupOutcome, ResolveError, SourceError,
};
