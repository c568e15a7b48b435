//! Seller-facing catalog CRUD.

use chrono::Utc;
use common::{Actor, Money, ProductId};
use domain::Product;
use serde::Deserialize;
use store::MarketStore;

use crate::{Result, ServiceError};

/// Payload for listing a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProductInput {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub is_active: Option<bool>,
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// Catalog write side. Reads are open; writes require the seller role and,
/// for existing rows, ownership.
pub struct CatalogService<S> {
    store: S,
}

impl<S: MarketStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input), fields(seller = %actor.user_id))]
    pub async fn create(&self, actor: &Actor, input: NewProductInput) -> Result<Product> {
        if !actor.can_manage_products() {
            return Err(ServiceError::Forbidden(
                "Not authorized to manage products".to_string(),
            ));
        }
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Please provide a product name".to_string(),
            ));
        }
        if input.price.is_negative() {
            return Err(ServiceError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(ServiceError::Validation(
                "Stock cannot be negative".to_string(),
            ));
        }

        let mut product = Product::new(
            actor.user_id,
            input.name,
            input.description.unwrap_or_default(),
            input.price,
            input.stock,
        );
        product.image_url = input.image_url;
        if let Some(active) = input.is_active {
            product.is_active = active;
        }
        self.store.insert_product(&product).await?;
        Ok(product)
    }

    /// Fetches any product by id.
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.store
            .product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// The caller's own products, newest first.
    pub async fn list_own(&self, actor: &Actor) -> Result<Vec<Product>> {
        if !actor.can_manage_products() {
            return Err(ServiceError::Forbidden(
                "Not authorized to manage products".to_string(),
            ));
        }
        Ok(self.store.products_by_seller(actor.user_id).await?)
    }

    /// Applies a patch to a product owned by the caller.
    ///
    /// A seller may reactivate a product with zero stock; only the
    /// confirm-time decrement forces deactivation.
    #[tracing::instrument(skip(self, patch), fields(seller = %actor.user_id))]
    pub async fn update(&self, actor: &Actor, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let mut product = self.get(id).await?;
        if product.seller != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Not authorized to update this product".to_string(),
            ));
        }

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "Please provide a product name".to_string(),
                ));
            }
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(price) = patch.price {
            if price.is_negative() {
                return Err(ServiceError::Validation(
                    "Price cannot be negative".to_string(),
                ));
            }
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            if stock < 0 {
                return Err(ServiceError::Validation(
                    "Stock cannot be negative".to_string(),
                ));
            }
            product.stock = stock;
        }
        if let Some(active) = patch.is_active {
            product.is_active = active;
        }
        product.updated_at = Utc::now();

        self.store.update_product(&product).await?;
        Ok(product)
    }

    /// Deletes a product owned by the caller.
    pub async fn delete(&self, actor: &Actor, id: ProductId) -> Result<()> {
        let product = self.get(id).await?;
        if product.seller != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Not authorized to delete this product".to_string(),
            ));
        }
        self.store.delete_product(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::{Role, UserId};
    use store::InMemoryStore;

    use super::*;

    fn service() -> (CatalogService<InMemoryStore>, Actor) {
        let store = InMemoryStore::new();
        (
            CatalogService::new(store),
            Actor::new(UserId::new(), Role::Seller),
        )
    }

    fn input(name: &str, cents: i64, stock: i64) -> NewProductInput {
        NewProductInput {
            name: name.to_string(),
            description: Some("Handmade".to_string()),
            image_url: None,
            price: Money::from_cents(cents),
            stock,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn create_and_list_own_products() {
        let (service, seller) = service();
        service.create(&seller, input("Scarf", 500, 3)).await.unwrap();
        service.create(&seller, input("Bag", 900, 1)).await.unwrap();

        let products = service.list_own(&seller).await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.seller == seller.user_id));
    }

    #[tokio::test]
    async fn buyers_cannot_create_products() {
        let (service, _) = service();
        let buyer = Actor::new(UserId::new(), Role::Buyer);
        let err = service
            .create(&buyer, input("Scarf", 500, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_is_owner_only() {
        let (service, seller) = service();
        let product = service.create(&seller, input("Scarf", 500, 3)).await.unwrap();

        let other = Actor::new(UserId::new(), Role::Seller);
        let err = service
            .update(&other, product.id, ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let patch = ProductPatch {
            price: Some(Money::from_cents(750)),
            stock: Some(9),
            ..Default::default()
        };
        let updated = service.update(&seller, product.id, patch).await.unwrap();
        assert_eq!(updated.price.cents(), 750);
        assert_eq!(updated.stock, 9);
    }

    #[tokio::test]
    async fn reactivation_at_zero_stock_is_tolerated() {
        let (service, seller) = service();
        let product = service.create(&seller, input("Scarf", 500, 0)).await.unwrap();

        let patch = ProductPatch {
            is_active: Some(true),
            ..Default::default()
        };
        let updated = service.update(&seller, product.id, patch).await.unwrap();
        assert!(updated.is_active);
        assert_eq!(updated.stock, 0);
    }

    #[tokio::test]
    async fn delete_is_owner_only() {
        let (service, seller) = service();
        let product = service.create(&seller, input("Scarf", 500, 3)).await.unwrap();

        let other = Actor::new(UserId::new(), Role::Seller);
        let err = service.delete(&other, product.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        service.delete(&seller, product.id).await.unwrap();
        let err = service.get(product.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn validation_rejects_bad_payloads() {
        let (service, seller) = service();
        let err = service.create(&seller, input("", 500, 3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = service.create(&seller, input("Scarf", -1, 3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = service.create(&seller, input("Scarf", 500, -2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
