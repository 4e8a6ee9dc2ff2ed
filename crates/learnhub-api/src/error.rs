//! Mapping of service errors onto HTTP responses

use axum::{http::StatusCode, Json};
use learnhub_core::CoreError;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) | CoreError::Conflict(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Upstream(_) | CoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: CoreError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    (status, Json(ErrorResponse::new(err.to_string(), err.code())))
}

/// 400 for bodies, paths or query strings that could not be extracted
pub fn invalid_request(detail: impl Into<String>) -> ApiError {
    let detail = detail.into();
    warn!("Malformed request: {}", detail);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(detail, "INVALID_REQUEST")),
    )
}
