pub mod cart;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod products;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path segment as a UUID, rejecting malformed ids with 400.
pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
