//! Read-side order queries and the seller-scoped view.

use chrono::{DateTime, Utc};
use common::{Actor, Money, OrderId, UserId};
use domain::{DeliveryAddress, Order, OrderItem, OrderNumber, OrderStatus};
use serde::Serialize;
use store::MarketStore;

use crate::{Result, ServiceError};

/// An order as one seller is allowed to see it: only that seller's line
/// items, with a total recomputed over them. Other sellers' lines and
/// prices never leave the service layer.
#[derive(Debug, Clone, Serialize)]
pub struct SellerOrderView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub buyer: UserId,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub delivery_address: DeliveryAddress,
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Projects an order down to one seller's slice of it.
pub fn seller_view(order: &Order, seller: UserId) -> SellerOrderView {
    let items: Vec<OrderItem> = order.items_for_seller(seller).cloned().collect();
    let total_amount = items.iter().map(OrderItem::line_total).sum();
    SellerOrderView {
        id: order.id,
        order_number: order.number,
        buyer: order.buyer,
        buyer_name: order.buyer_name.clone(),
        buyer_phone: order.buyer_phone.clone(),
        status: order.status,
        items,
        total_amount,
        delivery_address: order.delivery_address.clone(),
        tracking_number: order.tracking_number.clone(),
        delivered_at: order.delivered_at,
        created_at: order.created_at,
    }
}

/// Order read operations with per-actor authorization.
pub struct OrderQueries<S> {
    store: S,
}

impl<S: MarketStore> OrderQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// One order, visible to its buyer, its item sellers, and admins.
    pub async fn order_for(&self, actor: &Actor, id: OrderId) -> Result<Order> {
        let order = self
            .store
            .order(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        if !order.is_visible_to(actor) {
            return Err(ServiceError::Forbidden(
                "Not authorized to view this order".to_string(),
            ));
        }
        Ok(order)
    }

    /// The caller's own orders, newest first.
    pub async fn buyer_orders(&self, actor: &Actor) -> Result<Vec<Order>> {
        Ok(self.store.orders_by_buyer(actor.user_id).await?)
    }

    /// Orders containing the caller's items, newest first, filtered down
    /// to the caller's slice.
    pub async fn seller_orders(&self, actor: &Actor) -> Result<Vec<SellerOrderView>> {
        let orders = self.store.orders_by_seller(actor.user_id).await?;
        Ok(orders
            .iter()
            .map(|order| seller_view(order, actor.user_id))
            .collect())
    }
}
