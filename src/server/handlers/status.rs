//! JSON status handler.

use axum::{extract::State, http::StatusCode, response::Response};
use chrono::{DateTime, SecondsFormat, Utc};

use super::super::json::pretty_json;
use super::super::types::{AppState, LookupCounts, StatusResponse};
use crate::error_handling::LookupOutcome;

/// JSON status endpoint: dataset size, backend and lookup counters
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = &state.stats;
    let (dataset_source, loaded_at) = match state.backend.snapshot_info() {
        Some((source, loaded_at)) => (
            Some(source),
            Some(DateTime::<Utc>::from(loaded_at).to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        None => (None, None),
    };

    let response = StatusResponse {
        backend: state.backend.kind().as_str(),
        dataset_rows: state.backend.dataset_rows().await,
        dataset_source,
        loaded_at,
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        lookups: LookupCounts {
            total: stats.total(),
            found: stats.get(LookupOutcome::Found),
            not_found: stats.get(LookupOutcome::NotFound),
            invalid_address: stats.get(LookupOutcome::InvalidAddress),
            missing_address: stats.get(LookupOutcome::MissingAddress),
            resolution_failed: stats.get(LookupOutcome::ResolutionFailed),
        },
    };

    pretty_json(StatusCode::OK, &response)
}
