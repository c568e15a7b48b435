//! Service error taxonomy.

use domain::{CheckoutError, OrderStatus};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the application services.
///
/// The API layer maps these onto HTTP statuses: validation failures to
/// 400, missing or cross-tenant rows to 404 (existence is not leaked),
/// entitlement failures to 403, and transition/stock conflicts to 409.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or semantically invalid payload.
    #[error("{0}")]
    Validation(String),

    /// Unknown id, or a row owned by someone else.
    #[error("{0}")]
    NotFound(String),

    /// Authenticated but not entitled.
    #[error("{0}")]
    Forbidden(String),

    /// Checkout asked for more than the catalog currently holds.
    #[error("Only {available} items available for product: {name}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: u32,
    },

    /// The requested status change has no edge in the transition table.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A store failure, including conflicts detected inside the guarded
    /// status update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

impl From<CheckoutError> for ServiceError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyOrder
            | CheckoutError::InvalidQuantity
            | CheckoutError::ProductUnavailable { .. } => ServiceError::Validation(err.to_string()),
            CheckoutError::ProductNotFound { .. } => ServiceError::NotFound(err.to_string()),
            CheckoutError::InsufficientStock {
                name,
                available,
                requested,
            } => ServiceError::InsufficientStock {
                name,
                available,
                requested,
            },
        }
    }
}
