use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartItemId, Money, NotificationId, OrderId, ProductId, UserId};
use domain::{CartItem, Notification, Order, OrderStatus, Product};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{MarketStore, OrderStatusUpdate},
};

#[derive(Default)]
struct MemoryState {
    counters: HashMap<String, i64>,
    products: HashMap<ProductId, Product>,
    cart: Vec<CartItem>,
    orders: HashMap<OrderId, Order>,
    notifications: Vec<Notification>,
}

/// In-memory store implementation.
///
/// Backs tests and single-node development with the same interface as the
/// PostgreSQL implementation. Composite operations run under one write
/// guard, which gives them the same all-or-nothing behavior a transaction
/// provides.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of stored notifications across all recipients.
    pub async fn notification_count(&self) -> usize {
        self.state.read().await.notifications.len()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn next_sequence(&self, name: &str) -> Result<i64> {
        let mut state = self.state.write().await;
        let value = state.counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&product.id) {
            return Err(StoreError::NotFound { entity: "product" });
        }
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.products.remove(&id).is_some())
    }

    async fn products_by_seller(&self, seller: UserId) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| p.seller == seller)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn add_cart_item(
        &self,
        buyer: UserId,
        product: ProductId,
        quantity: u32,
        price_snapshot: Money,
    ) -> Result<(CartItem, bool)> {
        let mut state = self.state.write().await;
        if let Some(row) = state
            .cart
            .iter_mut()
            .find(|row| row.buyer == buyer && row.product == product)
        {
            row.quantity += quantity;
            row.updated_at = Utc::now();
            return Ok((row.clone(), false));
        }
        let row = CartItem::new(buyer, product, quantity, price_snapshot);
        state.cart.push(row.clone());
        Ok((row, true))
    }

    async fn cart_items(&self, buyer: UserId) -> Result<Vec<CartItem>> {
        let state = self.state.read().await;
        Ok(state
            .cart
            .iter()
            .rev()
            .filter(|row| row.buyer == buyer)
            .cloned()
            .collect())
    }

    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        buyer: UserId,
        quantity: u32,
    ) -> Result<Option<CartItem>> {
        let mut state = self.state.write().await;
        let Some(row) = state
            .cart
            .iter_mut()
            .find(|row| row.id == id && row.buyer == buyer)
        else {
            return Ok(None);
        };
        row.quantity = quantity;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn remove_cart_item(&self, id: CartItemId, buyer: UserId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.cart.len();
        state.cart.retain(|row| !(row.id == id && row.buyer == buyer));
        Ok(state.cart.len() < before)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.buyer == buyer)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        Ok(orders)
    }

    async fn orders_by_seller(&self, seller: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.has_seller(seller))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        update: OrderStatusUpdate,
    ) -> Result<Order> {
        let mut state = self.state.write().await;

        let actual = match state.orders.get(&id) {
            Some(order) => order.status,
            None => return Err(StoreError::NotFound { entity: "order" }),
        };
        if actual != expected {
            return Err(StoreError::StatusConflict {
                order_id: id,
                expected,
                actual,
            });
        }

        // Validate every decrement before applying any, so a late failure
        // cannot leave stock partially deducted.
        for decrement in &update.decrements {
            if let Some(product) = state.products.get(&decrement.product)
                && product.stock < i64::from(decrement.quantity)
            {
                return Err(StoreError::InsufficientStock {
                    product: decrement.product,
                    available: product.stock,
                    requested: decrement.quantity,
                });
            }
        }
        for decrement in &update.decrements {
            if let Some(product) = state.products.get_mut(&decrement.product) {
                product.stock -= i64::from(decrement.quantity);
                if product.stock <= 0 {
                    product.stock = 0;
                    product.is_active = false;
                }
                product.updated_at = Utc::now();
            }
        }

        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "order" })?;
        order.status = update.status;
        if let Some(tracking) = update.tracking_number {
            order.tracking_number = Some(tracking);
        }
        if let Some(delivered_at) = update.delivered_at {
            order.delivered_at = Some(delivered_at);
        }
        if let Some(result) = update.payment_result {
            order.payment_result = Some(result);
        }
        Ok(order.clone())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        let mut state = self.state.write().await;
        state.notifications.push(notification.clone());
        Ok(())
    }

    async fn notifications(&self, recipient: UserId, limit: i64) -> Result<Vec<Notification>> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient == recipient)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .count() as u64)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> Result<Option<Notification>> {
        let mut state = self.state.write().await;
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient == recipient)
        else {
            return Ok(None);
        };
        notification.is_read = true;
        Ok(Some(notification.clone()))
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_notification(&self, id: NotificationId, recipient: UserId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.id == id && n.recipient == recipient));
        Ok(state.notifications.len() < before)
    }

    async fn clear_notifications(&self, recipient: UserId) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.recipient != recipient);
        Ok((before - state.notifications.len()) as u64)
    }
}
