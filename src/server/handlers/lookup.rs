//! `GET /GeoIPLookup` handler.

use std::net::SocketAddr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::json::pretty_json;
use super::super::types::AppState;
use crate::error_handling::LookupOutcome;
use crate::geoip::{lookup, LookupResult};

/// Query string of the lookup endpoint
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    /// Address to resolve; empty counts as absent
    pub ip: Option<String>,
}

/// Resolves `?ip=`, or the peer address when the parameter is absent.
///
/// A query string that does not deserialize is answered like any other 400.
pub async fn lookup_handler(
    State(state): State<AppState>,
    query: Result<Query<LookupParams>, QueryRejection>,
    request: Request,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => return error_response(&state, ApiError::from(rejection)),
    };
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let address = params.ip.filter(|ip| !ip.is_empty()).or(peer);
    lookup_response(&state, address).await
}

/// Runs one lookup and turns the outcome into an HTTP response.
pub async fn lookup_response(state: &AppState, address: Option<String>) -> Response {
    match run_lookup(state, address).await {
        Ok(result) => {
            let outcome = if result.found {
                LookupOutcome::Found
            } else {
                LookupOutcome::NotFound
            };
            state.stats.record(outcome);
            pretty_json(StatusCode::OK, &result)
        }
        Err(err) => error_response(state, err),
    }
}

fn error_response(state: &AppState, err: ApiError) -> Response {
    state.stats.record(err.outcome());
    if let ApiError::ResolutionFailed(e) = &err {
        error!("{e}");
    } else {
        debug!("Rejected lookup: {err}");
    }
    err.into_response()
}

async fn run_lookup(state: &AppState, address: Option<String>) -> Result<LookupResult, ApiError> {
    let address = address.ok_or(ApiError::MissingAddress)?;
    let result = lookup(&address, state.backend.as_ref()).await?;
    debug!("Lookup {} found={}", result.queried_address, result.found);
    Ok(result)
}
