//! Order aggregate builder: checkout validation, snapshotting, and
//! per-seller notification fan-out.

use common::Actor;
use domain::checkout::{self, CheckoutLine};
use domain::{DeliveryAddress, NewOrder, Notification, Order, OrderNumber, PaymentMethod};
use store::MarketStore;

use crate::Result;

/// Name of the sequence that hands out order numbers.
pub const ORDER_SEQUENCE: &str = "orderCounter";

/// A checkout payload: requested lines plus delivery details.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub items: Vec<CheckoutLine>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: Option<PaymentMethod>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
}

/// Builds and persists order snapshots.
pub struct CheckoutService<S> {
    store: S,
}

impl<S: MarketStore> CheckoutService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates the payload against the catalog and persists a pending
    /// order, notifying every distinct seller involved.
    ///
    /// Stock is checked but never decremented here: a pending order holds
    /// no inventory until a seller confirms it.
    #[tracing::instrument(skip(self, request), fields(buyer = %actor.user_id))]
    pub async fn place_order(&self, actor: &Actor, request: PlaceOrder) -> Result<Order> {
        let mut resolved = Vec::with_capacity(request.items.len());
        for line in request.items {
            let product = self.store.product(line.product).await?;
            resolved.push((line, product));
        }
        let items = checkout::snapshot_items(&resolved)?;

        // Any sequence failure aborts before the first write: an order is
        // never persisted without its number.
        let number = OrderNumber::new(self.store.next_sequence(ORDER_SEQUENCE).await?);

        let order = Order::create(NewOrder {
            number,
            buyer: actor.user_id,
            buyer_name: request
                .buyer_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Customer".to_string()),
            buyer_phone: request
                .buyer_phone
                .filter(|phone| !phone.trim().is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            items,
            delivery_address: request.delivery_address,
            payment_method: request.payment_method.unwrap_or_default(),
        });
        self.store.insert_order(&order).await?;

        let sellers = order.seller_ids();
        for seller in &sellers {
            self.store
                .insert_notification(&Notification::new_order_for_seller(*seller, &order))
                .await?;
        }

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order = %order.number, sellers = sellers.len(), "order placed");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use common::{Money, ProductId, Role, UserId};
    use domain::{NotificationKind, OrderStatus, Product};
    use store::{InMemoryStore, MarketStore};

    use super::*;
    use crate::ServiceError;

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip_code: "411001".to_string(),
            country: "India".to_string(),
        }
    }

    fn payload(items: Vec<CheckoutLine>) -> PlaceOrder {
        PlaceOrder {
            items,
            delivery_address: address(),
            payment_method: None,
            buyer_name: Some("Asha".to_string()),
            buyer_phone: None,
        }
    }

    async fn seeded_product(store: &InMemoryStore, seller: UserId, cents: i64, stock: i64) -> Product {
        let product = Product::new(seller, "Scarf", "", Money::from_cents(cents), stock);
        store.insert_product(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn place_order_creates_pending_order_without_touching_stock() {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let buyer = Actor::new(UserId::new(), Role::Buyer);
        let product = seeded_product(&store, UserId::new(), 500, 2).await;

        let order = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: product.id,
                    quantity: 2,
                }]),
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items_price.cents(), 1000);
        assert_eq!(order.total_price.cents(), 1000);
        assert_eq!(order.buyer_phone, "N/A");
        // Stock is untouched at order creation.
        assert_eq!(store.product(product.id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn one_notification_per_distinct_seller() {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let buyer = Actor::new(UserId::new(), Role::Buyer);

        let seller_a = UserId::new();
        let seller_b = UserId::new();
        let pa1 = seeded_product(&store, seller_a, 100, 9).await;
        let pa2 = seeded_product(&store, seller_a, 200, 9).await;
        let pb = seeded_product(&store, seller_b, 300, 9).await;

        let lines = [pa1.id, pa2.id, pb.id]
            .into_iter()
            .map(|product| CheckoutLine {
                product,
                quantity: 1,
            })
            .collect();
        service.place_order(&buyer, payload(lines)).await.unwrap();

        let inbox_a = store.notifications(seller_a, 50).await.unwrap();
        let inbox_b = store.notifications(seller_b, 50).await.unwrap();
        assert_eq!(inbox_a.len(), 1);
        assert_eq!(inbox_b.len(), 1);
        assert_eq!(inbox_a[0].kind, NotificationKind::NewOrder);
        // Each seller sees only their own items.
        assert!(!inbox_b[0].message.contains("Qty: 2"));
        assert_eq!(store.notification_count().await, 2);
    }

    #[tokio::test]
    async fn totals_are_frozen_against_later_price_changes() {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let buyer = Actor::new(UserId::new(), Role::Buyer);
        let mut product = seeded_product(&store, UserId::new(), 500, 5).await;

        let order = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: product.id,
                    quantity: 1,
                }]),
            )
            .await
            .unwrap();

        product.price = Money::from_cents(9999);
        store.update_product(&product).await.unwrap();

        let reloaded = store.order(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.items[0].price.cents(), 500);
        assert_eq!(reloaded.total_price.cents(), 500);
    }

    #[tokio::test]
    async fn order_numbers_increase_across_orders() {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let buyer = Actor::new(UserId::new(), Role::Buyer);
        let product = seeded_product(&store, UserId::new(), 500, 10).await;

        let first = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: product.id,
                    quantity: 1,
                }]),
            )
            .await
            .unwrap();
        let second = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: product.id,
                    quantity: 1,
                }]),
            )
            .await
            .unwrap();

        assert!(second.number > first.number);
        assert_eq!(first.number.to_string(), "ORD0001");
        assert_eq!(second.number.to_string(), "ORD0002");
    }

    #[tokio::test]
    async fn rejects_empty_unknown_inactive_and_overdrawn_lines() {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let buyer = Actor::new(UserId::new(), Role::Buyer);

        let err = service.place_order(&buyer, payload(vec![])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: ProductId::new(),
                    quantity: 1,
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let mut inactive = Product::new(UserId::new(), "Gone", "", Money::from_cents(100), 5);
        inactive.is_active = false;
        store.insert_product(&inactive).await.unwrap();
        let err = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: inactive.id,
                    quantity: 1,
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let scarce = seeded_product(&store, UserId::new(), 100, 2).await;
        let err = service
            .place_order(
                &buyer,
                payload(vec![CheckoutLine {
                    product: scarce.id,
                    quantity: 3,
                }]),
            )
            .await
            .unwrap_err();
        match err {
            ServiceError::InsufficientStock { available, requested, .. } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing was persisted by any failed attempt.
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.notification_count().await, 0);
    }
}
