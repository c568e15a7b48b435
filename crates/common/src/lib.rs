//! Shared vocabulary types used across the marketplace crates.

mod actor;
mod ids;
mod money;

pub use actor::{Actor, Role};
pub use ids::{CartItemId, NotificationId, OrderId, ProductId, UserId};
pub use money::Money;
