//! Cart row: one (buyer, product) line with a price snapshot.

use chrono::{DateTime, Utc};
use common::{CartItemId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A persistent cart line.
///
/// Unique per (buyer, product): adding a product already in the cart
/// increments the quantity instead of inserting a second row. The price
/// snapshot is taken at add time and never re-validated on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub buyer: UserId,
    pub product: ProductId,
    pub quantity: u32,
    pub price_snapshot: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(buyer: UserId, product: ProductId, quantity: u32, price_snapshot: Money) -> Self {
        let now = Utc::now();
        Self {
            id: CartItemId::new(),
            buyer,
            product,
            quantity,
            price_snapshot,
            created_at: now,
            updated_at: now,
        }
    }
}
