//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (address base, server defaults, import limits)
//! - The library `Config` and its validation
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, ConvertCommand, ImportCommand, LookupCommand, ServeCommand};
pub use constants::*;
pub use types::{BackendKind, Config, LogFormat, LogLevel};
