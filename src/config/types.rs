//! Configuration types.
//!
//! This module defines the enums and the library `Config` struct used to run
//! the lookup server. The CLI layer in `cli.rs` converts into these types.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{DB_PATH, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::error_handling::ConfigValidationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where the server reads ranges from on each lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Load every range into an immutable in-memory snapshot at startup
    Memory,
    /// Run a range query against SQLite for every lookup
    Sqlite,
}

impl BackendKind {
    /// Lowercase name, as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

/// Server configuration (no CLI dependencies).
///
/// Logging is configured separately, before any subcommand runs.
///
/// # Examples
///
/// ```no_run
/// use geoip_ranges::Config;
///
/// let config = Config {
///     port: 8080,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Address to bind the HTTP server to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    /// Range backend used for lookups
    pub backend: BackendKind,

    /// Rebuild the in-memory snapshot from SQLite every N seconds (memory backend only)
    pub reload_interval_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            backend: BackendKind::Memory,
            reload_interval_secs: None,
        }
    }
}

impl Config {
    /// Checks field values that clap cannot express as types.
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.port == 0 {
            return Err(ConfigValidationError::new(
                "port",
                "port must be greater than 0",
            ));
        }
        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigValidationError::new(
                "bind_addr",
                format!(
                    "'{}' is not an IP address (e.g. 127.0.0.1 or ::)",
                    self.bind_addr
                ),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::new(
                "db_path",
                "database path must not be empty",
            ));
        }
        match self.reload_interval_secs {
            Some(0) => {
                return Err(ConfigValidationError::new(
                    "reload_interval_secs",
                    "reload interval must be greater than 0 seconds",
                ))
            }
            Some(_) if self.backend != BackendKind::Memory => {
                return Err(ConfigValidationError::new(
                    "reload_interval_secs",
                    "reload interval only applies to the memory backend",
                ))
            }
            _ => {}
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn listen_addr(&self) -> String {
        match self.bind_addr.parse::<std::net::IpAddr>() {
            Ok(std::net::IpAddr::V6(_)) => format!("[{}]:{}", self.bind_addr, self.port),
            _ => format!("{}:{}", self.bind_addr, self.port),
        }
    }

    /// Snapshot reload interval, if periodic reloading is enabled
    pub fn reload_interval(&self) -> Option<Duration> {
        self.reload_interval_secs.map(Duration::from_secs)
    }
}
