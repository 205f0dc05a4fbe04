//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::AppState;
use crate::error_handling::LookupOutcome;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let mut metrics = String::from(
        "# HELP geoip_ranges_lookups_total Lookup requests by outcome\n\
         # TYPE geoip_ranges_lookups_total counter\n",
    );
    for outcome in LookupOutcome::iter() {
        let _ = writeln!(
            metrics,
            "geoip_ranges_lookups_total{{outcome=\"{}\"}} {}",
            outcome.metric_label(),
            state.stats.get(outcome)
        );
    }

    // NaN marks a dataset size that could not be read
    let dataset_rows = match state.backend.dataset_rows().await {
        Some(rows) => rows.to_string(),
        None => "NaN".to_string(),
    };
    let _ = write!(
        metrics,
        r#"
# HELP geoip_ranges_lookup_errors_total Lookup requests answered with an error status
# TYPE geoip_ranges_lookup_errors_total counter
geoip_ranges_lookup_errors_total {}

# HELP geoip_ranges_dataset_rows Ranges in the served dataset
# TYPE geoip_ranges_dataset_rows gauge
geoip_ranges_dataset_rows {}

# HELP geoip_ranges_uptime_seconds Seconds since the server started
# TYPE geoip_ranges_uptime_seconds gauge
geoip_ranges_uptime_seconds {}
"#,
        state.stats.total_errors(),
        dataset_rows,
        state.start_time.elapsed().as_secs_f64(),
    );

    (StatusCode::OK, metrics).into_response()
}
