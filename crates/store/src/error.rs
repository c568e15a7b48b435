use common::{OrderId, ProductId};
use domain::OrderStatus;
use thiserror::Error;

/// Errors that can occur when interacting with the marketplace store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row the operation depends on does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A guarded status update found the order in a different status than
    /// expected — either an invalid transition or a lost race.
    #[error("order {order_id} is {actual}, expected {expected}")]
    StatusConflict {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// A conditional stock decrement could not be satisfied. The whole
    /// surrounding unit is rolled back.
    #[error("insufficient stock for product {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: ProductId,
        available: i64,
        requested: u32,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
