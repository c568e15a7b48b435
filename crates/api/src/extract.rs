//! Caller identity extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{Actor, Role, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// Extracts the authenticated caller from the `x-user-id` and
/// `x-user-role` headers set by the upstream auth gateway.
///
/// Requests without a valid identity are rejected with 401; this service
/// never sees credentials.
pub struct Caller(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        Ok(Caller(Actor::new(UserId::from_uuid(user_id), role)))
    }
}
