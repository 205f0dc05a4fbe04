//! Error type definitions.
//!
//! This module defines all error types and lookup outcome categories used
//! throughout the application.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// A configuration field that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending `Config` field
    pub field: &'static str,
    /// What is wrong and what is expected
    pub message: String,
}

impl ConfigValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Error returned when a string is not a valid IPv4 or IPv6 address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address is neither a dotted-quad IPv4 address nor an IPv6 address
    /// (optionally with an embedded IPv4 tail).
    #[error("Invalid IP address \"{address}\": {reason}")]
    InvalidAddressFormat {
        /// The rejected input, verbatim
        address: String,
        /// Which part of the input was malformed
        reason: String,
    },
}

impl AddressError {
    pub(crate) fn invalid(address: &str, reason: impl Into<String>) -> Self {
        AddressError::InvalidAddressFormat {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error raised by a range source while fetching candidate ranges.
#[derive(Error, Debug)]
pub enum SourceError {
    /// SQL execution error.
    #[error("range query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a range record.
    #[error("stored range row is malformed: {0}")]
    MalformedRow(String),

    /// The snapshot lock was poisoned by a panicking writer.
    #[error("range snapshot is unavailable (lock poisoned)")]
    SnapshotPoisoned,
}

/// Error types for range resolution.
///
/// A missing range is not an error; it is a lookup result with `found = false`.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The range source failed while fetching candidates.
    #[error("GeoIP search failed: {0}")]
    ResolutionFailed(#[from] SourceError),
}

/// Error types for a full lookup (normalize, then resolve).
#[derive(Error, Debug)]
pub enum LookupError {
    /// The address could not be normalized; no range query was made.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// The range query failed.
    #[error(transparent)]
    Resolution(#[from] ResolveError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Error for a single feed row that cannot become a range record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The row does not have the expected number of columns.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Columns in the feed layout
        expected: usize,
        /// Columns present in the row
        found: usize,
    },

    /// A key column is not a decimal unsigned 128-bit integer.
    #[error("{column} is not a 128-bit decimal key: \"{value}\"")]
    InvalidKey {
        /// Column name
        column: &'static str,
        /// Raw value
        value: String,
    },

    /// A coordinate column is not a finite number.
    #[error("{column} is not a number: \"{value}\"")]
    InvalidCoordinate {
        /// Column name
        column: &'static str,
        /// Raw value
        value: String,
    },

    /// The range bounds are reversed.
    #[error("ipFrom {from} is greater than ipTo {to}")]
    InvertedRange {
        /// Lower bound as written
        from: u128,
        /// Upper bound as written
        to: u128,
    },
}

/// Outcome categories of a lookup request, counted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LookupOutcome {
    /// A covering range was found
    Found,
    /// The address is valid but no range covers it
    NotFound,
    /// The address failed normalization (HTTP 400)
    InvalidAddress,
    /// No address was given and none could be derived from the connection (HTTP 400)
    MissingAddress,
    /// The range source failed (HTTP 500)
    ResolutionFailed,
}

impl std::fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LookupOutcome {
    /// Human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Found => "Found",
            LookupOutcome::NotFound => "Not found",
            LookupOutcome::InvalidAddress => "Invalid address",
            LookupOutcome::MissingAddress => "No IP available",
            LookupOutcome::ResolutionFailed => "Resolution failed",
        }
    }

    /// Label value used in Prometheus metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            LookupOutcome::Found => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::InvalidAddress => "invalid_address",
            LookupOutcome::MissingAddress => "missing_address",
            LookupOutcome::ResolutionFailed => "resolution_failed",
        }
    }

    /// Whether this outcome is reported to the client as an error
    pub fn is_error(&self) -> bool {
        !matches!(self, LookupOutcome::Found | LookupOutcome::NotFound)
    }
}
