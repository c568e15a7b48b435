//! Checkout validation and snapshotting.
//!
//! Pure functions over already-resolved products; the `services` crate
//! resolves catalog rows and persists the result. Validation fails fast in
//! the order the lines were submitted: missing product, inactive product,
//! insufficient stock.

use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::OrderItem;
use crate::product::Product;

/// One requested line of a checkout payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product: ProductId,
    pub quantity: u32,
}

/// Why a checkout payload was rejected. No order is persisted on any of
/// these; validation runs to completion before the first write.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("No order items")]
    EmptyOrder,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Product not found: {product}")]
    ProductNotFound { product: ProductId },

    #[error("Product {name} is not available")]
    ProductUnavailable { name: String },

    #[error("Only {available} items available for product: {name}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: u32,
    },
}

/// Validates checkout lines against their resolved products and snapshots
/// them into order items.
///
/// Stock is only *checked* here; it is not reserved or decremented until a
/// seller confirms the order.
pub fn snapshot_items(
    lines: &[(CheckoutLine, Option<Product>)],
) -> Result<Vec<OrderItem>, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let mut items = Vec::with_capacity(lines.len());
    for (line, product) in lines {
        if line.quantity < 1 {
            return Err(CheckoutError::InvalidQuantity);
        }
        let product = product.as_ref().ok_or(CheckoutError::ProductNotFound {
            product: line.product,
        })?;
        if !product.is_active {
            return Err(CheckoutError::ProductUnavailable {
                name: product.name.clone(),
            });
        }
        if !product.has_stock(line.quantity) {
            return Err(CheckoutError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: line.quantity,
            });
        }
        items.push(OrderItem {
            product: product.id,
            product_name: product.name.clone(),
            product_image: product.snapshot_image(),
            quantity: line.quantity,
            price: product.price,
            seller: product.seller,
        });
    }
    Ok(items)
}

/// Sum of `price * quantity` over the items.
pub fn items_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

/// Distinct sellers across the items, in first-seen order.
pub fn sellers_of(items: &[OrderItem]) -> Vec<UserId> {
    let mut sellers = Vec::new();
    for item in items {
        if !sellers.contains(&item.seller) {
            sellers.push(item.seller);
        }
    }
    sellers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(seller: UserId, name: &str, cents: i64, stock: i64) -> Product {
        Product::new(seller, name, "", Money::from_cents(cents), stock)
    }

    fn line(product: &Product, quantity: u32) -> (CheckoutLine, Option<Product>) {
        (
            CheckoutLine {
                product: product.id,
                quantity,
            },
            Some(product.clone()),
        )
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert_eq!(snapshot_items(&[]), Err(CheckoutError::EmptyOrder));
    }

    #[test]
    fn unknown_product_is_rejected() {
        let missing = ProductId::new();
        let result = snapshot_items(&[(
            CheckoutLine {
                product: missing,
                quantity: 1,
            },
            None,
        )]);
        assert_eq!(result, Err(CheckoutError::ProductNotFound { product: missing }));
    }

    #[test]
    fn inactive_product_is_rejected() {
        let mut p = product(UserId::new(), "Scarf", 500, 5);
        p.is_active = false;
        let result = snapshot_items(&[line(&p, 1)]);
        assert_eq!(
            result,
            Err(CheckoutError::ProductUnavailable {
                name: "Scarf".to_string()
            })
        );
    }

    #[test]
    fn insufficient_stock_reports_availability() {
        let p = product(UserId::new(), "Scarf", 500, 2);
        let result = snapshot_items(&[line(&p, 3)]);
        assert_eq!(
            result,
            Err(CheckoutError::InsufficientStock {
                name: "Scarf".to_string(),
                available: 2,
                requested: 3,
            })
        );
    }

    #[test]
    fn validation_fails_fast_in_line_order() {
        let good = product(UserId::new(), "Scarf", 500, 5);
        let mut inactive = product(UserId::new(), "Bag", 900, 5);
        inactive.is_active = false;
        let result = snapshot_items(&[line(&good, 1), line(&inactive, 1)]);
        assert_eq!(
            result,
            Err(CheckoutError::ProductUnavailable {
                name: "Bag".to_string()
            })
        );
    }

    #[test]
    fn snapshot_copies_product_fields() {
        let seller = UserId::new();
        let mut p = product(seller, "Scarf", 500, 5);
        p.image_url = Some("https://cdn.example/scarf.jpg".to_string());
        let items = snapshot_items(&[line(&p, 2)]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Scarf");
        assert_eq!(items[0].product_image, "https://cdn.example/scarf.jpg");
        assert_eq!(items[0].price.cents(), 500);
        assert_eq!(items[0].seller, seller);
        assert_eq!(items_total(&items).cents(), 1000);
    }

    #[test]
    fn sellers_of_deduplicates() {
        let a = UserId::new();
        let b = UserId::new();
        let pa = product(a, "A", 100, 9);
        let pb = product(b, "B", 100, 9);
        let pa2 = product(a, "A2", 100, 9);
        let items = snapshot_items(&[line(&pa, 1), line(&pb, 1), line(&pa2, 1)]).unwrap();
        assert_eq!(sellers_of(&items), vec![a, b]);
    }
}
