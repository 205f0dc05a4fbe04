//! Lookup server HTTP handlers.

mod lookup;
mod metrics;
mod status;

pub use lookup::{lookup_handler, lookup_response, LookupParams};
pub use metrics::metrics_handler;
pub use status::status_handler;
