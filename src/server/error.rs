//! Lookup endpoint errors and their HTTP responses.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::json::pretty_json;
use super::types::{ErrorBody, FailureBody};
use crate::error_handling::{AddressError, LookupError, LookupOutcome, ResolveError};

/// Fixed `error` text of a failed range query.
pub const SEARCH_FAILED: &str = "GeoIP search failed";

/// Message returned when neither a query address nor a peer address exists.
pub const NO_IP_AVAILABLE: &str = "No IP available";

/// Ways a lookup request can fail, each mapped to one HTTP response.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Neither `?ip=` nor a peer address (400)
    #[error("No IP available")]
    MissingAddress,

    /// The query string did not deserialize, e.g. a repeated `ip` (400)
    #[error(transparent)]
    InvalidQuery(#[from] QueryRejection),

    /// The address failed normalization (400)
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// The range source failed (500)
    #[error(transparent)]
    ResolutionFailed(#[from] ResolveError),
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidAddress(e) => ApiError::InvalidAddress(e),
            LookupError::Resolution(e) => ApiError::ResolutionFailed(e),
        }
    }
}

impl ApiError {
    /// Outcome counted for this error
    pub fn outcome(&self) -> LookupOutcome {
        match self {
            ApiError::MissingAddress => LookupOutcome::MissingAddress,
            ApiError::InvalidQuery(_) | ApiError::InvalidAddress(_) => {
                LookupOutcome::InvalidAddress
            }
            ApiError::ResolutionFailed(_) => LookupOutcome::ResolutionFailed,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAddress | ApiError::InvalidQuery(_) | ApiError::InvalidAddress(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResolutionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::ResolutionFailed(ResolveError::ResolutionFailed(source)) => pretty_json(
                status,
                &FailureBody {
                    error: SEARCH_FAILED,
                    details: source.to_string(),
                },
            ),
            other => pretty_json(
                status,
                &ErrorBody {
                    error: other.to_string(),
                },
            ),
        }
    }
}
