//! Buyer cart operations.

use common::{Actor, CartItemId, ProductId};
use domain::{CartItem, Product};
use serde::Serialize;
use store::MarketStore;

use crate::{Result, ServiceError};

/// A cart row joined with its current product, when it still exists.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Option<Product>,
}

/// Cart store operations, all scoped to the authenticated buyer.
///
/// No stock is checked here; a buyer may cart more than is available.
/// Stock is only validated at order creation.
pub struct CartService<S> {
    store: S,
}

impl<S: MarketStore> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a product to the cart, incrementing the existing row if one
    /// exists. Returns the row and whether it was newly created.
    #[tracing::instrument(skip(self), fields(buyer = %actor.user_id))]
    pub async fn add(
        &self,
        actor: &Actor,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(CartItem, bool)> {
        if quantity < 1 {
            return Err(ServiceError::Validation("Invalid payload".to_string()));
        }
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let (row, created) = self
            .store
            .add_cart_item(actor.user_id, product_id, quantity, product.price)
            .await?;
        Ok((row, created))
    }

    /// The buyer's cart, newest first, with current product data attached.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<CartLine>> {
        let rows = self.store.cart_items(actor.user_id).await?;
        let mut lines = Vec::with_capacity(rows.len());
        for item in rows {
            let product = self.store.product(item.product).await?;
            lines.push(CartLine { item, product });
        }
        Ok(lines)
    }

    /// Overwrites a row's quantity. Rows owned by other buyers read as
    /// missing.
    pub async fn set_quantity(
        &self,
        actor: &Actor,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem> {
        if quantity < 1 {
            return Err(ServiceError::Validation(
                "Quantity must be >= 1".to_string(),
            ));
        }
        self.store
            .set_cart_quantity(id, actor.user_id, quantity)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))
    }

    /// Deletes a row. Rows owned by other buyers read as missing.
    pub async fn remove(&self, actor: &Actor, id: CartItemId) -> Result<()> {
        if self.store.remove_cart_item(id, actor.user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Cart item not found".to_string()))
        }
    }
}
