//! Main application modules.
//!
//! Background snapshot reloading and shutdown handling used by the server.

pub mod reload;
pub mod shutdown;

// Re-export public API
pub use reload::spawn_reload_task;
pub use shutdown::{shutdown_gracefully, wait_for_shutdown_signal};
