//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use services::ServiceError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
///
/// Every error body has the shape `{"success": false, "message": …}`.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed caller identity.
    Unauthorized(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Service-layer failure.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(err) => service_error_to_response(err),
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::Validation(_) | ServiceError::InsufficientStock { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        ServiceError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::Store(store_err) => match store_err {
            // Conflicts surfaced by the guarded status update: a racing
            // transition or stock that ran out under the confirm.
            StoreError::StatusConflict { .. } | StoreError::InsufficientStock { .. } => {
                (StatusCode::CONFLICT, err.to_string())
            }
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            _ => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        },
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
