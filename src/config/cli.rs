//! Command-line interface definitions.
//!
//! Kept in the library so the binary stays a thin wrapper and the parsing
//! rules can be tested directly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{DB_PATH, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::config::types::{BackendKind, Config, LogFormat, LogLevel};

/// Resolve IP addresses to geolocation records from a range table.
#[derive(Debug, Parser)]
#[command(name = "geoip_ranges", version, about)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /GeoIPLookup` over HTTP
    #[command(name = "serve")]
    Serve(ServeCommand),
    /// Load a range feed CSV into the SQLite database
    #[command(name = "import")]
    Import(ImportCommand),
    /// Filter placeholder rows out of a raw feed CSV into a new CSV file
    #[command(name = "convert")]
    Convert(ConvertCommand),
    /// Resolve a single address against the SQLite database and print JSON
    #[command(name = "lookup")]
    Lookup(LookupCommand),
}

/// Options for `serve`.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// SQLite database holding the ranges
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Address to bind to
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Range backend used for lookups
    #[arg(long, value_enum, default_value_t = BackendKind::Memory)]
    pub backend: BackendKind,

    /// Rebuild the in-memory snapshot from SQLite every N seconds
    #[arg(long)]
    pub reload_interval_secs: Option<u64>,
}

/// Options for `import`.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Feed CSV (raw headerless feed or a converted file with header)
    pub input: PathBuf,

    /// SQLite database to write to
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Delete existing ranges before importing
    #[arg(long)]
    pub replace: bool,
}

/// Options for `convert`.
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Raw feed CSV
    pub input: PathBuf,

    /// Filtered CSV to write
    pub output: PathBuf,
}

/// Options for `lookup`.
#[derive(Debug, Args)]
pub struct LookupCommand {
    /// IPv4 or IPv6 address
    pub ip: String,

    /// SQLite database holding the ranges
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,
}

impl ServeCommand {
    /// Builds the library server configuration.
    pub fn into_config(self) -> Config {
        Config {
            db_path: self.db_path,
            bind_addr: self.bind,
            port: self.port,
            backend: self.backend,
            reload_interval_secs: self.reload_interval_secs,
        }
    }
}
