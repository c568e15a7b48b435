//! Persistence layer for the marketplace.
//!
//! [`MarketStore`] is the storage contract consumed by the service layer.
//! Two backends implement it: [`InMemoryStore`] for tests and single-node
//! development, and [`PostgresStore`] for production. Both guarantee the
//! same atomicity for the invariant-bearing operations: sequence
//! increments and the status-change-plus-stock-decrement unit used by
//! seller confirmation.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{MarketStore, OrderStatusUpdate, StockDecrement};
