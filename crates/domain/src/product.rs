//! Catalog product record.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A product listed by a seller.
///
/// `is_active == false` with `stock == 0` is forced by the confirm-time
/// stock decrement; a seller may still reactivate a product at zero stock
/// manually, and the catalog tolerates that combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller: UserId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new active product for a seller.
    pub fn new(
        seller: UserId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            seller,
            name: name.into(),
            description: description.into(),
            image_url: None,
            price,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the product can cover the requested quantity.
    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }

    /// Image used for order snapshots; empty string when none is set.
    pub fn snapshot_image(&self) -> String {
        self.image_url.clone().unwrap_or_default()
    }
}
