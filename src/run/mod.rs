//! Command entry points shared by the binary and library users.

mod serve;
mod tools;

pub use serve::run_server;
pub use tools::{run_convert, run_import, run_lookup};
