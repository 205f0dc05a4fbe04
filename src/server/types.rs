//! Lookup server data structures.

use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use serde::Serialize;

use crate::config::BackendKind;
use crate::error_handling::{LookupStats, SourceError};
use crate::geoip::{AddressKey, RangeRecord, RangeSource, SnapshotHandle};
use crate::storage::{count_ranges, SqliteRangeSource};

/// Where the server reads ranges from.
pub enum LookupBackend {
    /// Swappable in-memory snapshot
    Memory(Arc<SnapshotHandle>),
    /// Per-request SQLite query
    Sqlite(SqliteRangeSource),
}

impl LookupBackend {
    /// Backend kind, as named on the command line
    pub fn kind(&self) -> BackendKind {
        match self {
            LookupBackend::Memory(_) => BackendKind::Memory,
            LookupBackend::Sqlite(_) => BackendKind::Sqlite,
        }
    }

    /// Number of ranges currently served, or `None` if it cannot be read.
    pub async fn dataset_rows(&self) -> Option<usize> {
        match self {
            LookupBackend::Memory(handle) => handle.row_count(),
            LookupBackend::Sqlite(source) => match count_ranges(source.pool()).await {
                Ok(count) => usize::try_from(count).ok(),
                Err(e) => {
                    log::warn!("Failed to count stored ranges: {e}");
                    None
                }
            },
        }
    }

    /// Source description and build time of the served snapshot, if any.
    pub fn snapshot_info(&self) -> Option<(String, SystemTime)> {
        match self {
            LookupBackend::Memory(handle) => handle.current().ok().map(|snapshot| {
                let metadata = snapshot.metadata();
                (metadata.source.clone(), metadata.loaded_at)
            }),
            LookupBackend::Sqlite(_) => None,
        }
    }
}

impl RangeSource for LookupBackend {
    fn candidates(
        &self,
        key: AddressKey,
    ) -> impl Future<Output = Result<Vec<RangeRecord>, SourceError>> + Send {
        async move {
            match self {
                LookupBackend::Memory(handle) => handle.candidates(key).await,
                LookupBackend::Sqlite(source) => source.candidates(key).await,
            }
        }
    }
}

/// Shared state for the lookup server
#[derive(Clone)]
pub struct AppState {
    /// Range source for lookups
    pub backend: Arc<LookupBackend>,
    /// Per-outcome lookup counters
    pub stats: Arc<LookupStats>,
    /// When the server started
    pub start_time: Arc<Instant>,
}

impl AppState {
    /// State with fresh counters, starting the uptime clock now.
    pub fn new(backend: LookupBackend) -> Self {
        AppState {
            backend: Arc::new(backend),
            stats: Arc::new(LookupStats::new()),
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// Body of a 400 response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// What was wrong with the request
    pub error: String,
}

/// Body of a 500 response
#[derive(Debug, Serialize)]
pub struct FailureBody {
    /// Fixed failure text
    pub error: &'static str,
    /// Underlying source error
    pub details: String,
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    /// `memory` or `sqlite`
    pub backend: &'static str,
    /// Ranges served, omitted when the count cannot be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_rows: Option<usize>,
    /// Source of the in-memory snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_source: Option<String>,
    /// RFC 3339 build time of the in-memory snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    /// Seconds since the server started
    pub uptime_seconds: f64,
    /// Lookup counters
    pub lookups: LookupCounts,
}

/// Lookup counters by outcome
#[derive(Serialize)]
pub struct LookupCounts {
    /// All lookup requests
    pub total: usize,
    /// Answered with a covering range
    pub found: usize,
    /// Valid address, no covering range
    pub not_found: usize,
    /// Rejected address or query string
    pub invalid_address: usize,
    /// No address to look up
    pub missing_address: usize,
    /// Range source failures
    pub resolution_failed: usize,
}
