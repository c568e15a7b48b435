//! Notifications and their construction from order events.

use chrono::{DateTime, Utc};
use common::{NotificationId, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewOrder,
    Order,
    OrderConfirmed,
    Stock,
    Payment,
    System,
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewOrder => "new_order",
            NotificationKind::Order => "order",
            NotificationKind::OrderConfirmed => "order_confirmed",
            NotificationKind::Stock => "stock",
            NotificationKind::Payment => "payment",
            NotificationKind::System => "system",
            NotificationKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new_order" => Some(NotificationKind::NewOrder),
            "order" => Some(NotificationKind::Order),
            "order_confirmed" => Some(NotificationKind::OrderConfirmed),
            "stock" => Some(NotificationKind::Stock),
            "payment" => Some(NotificationKind::Payment),
            "system" => Some(NotificationKind::System),
            "other" => Some(NotificationKind::Other),
            _ => None,
        }
    }
}

/// The entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum RelatedRef {
    Order(OrderId),
    Product(ProductId),
    User(UserId),
}

/// A message delivered to a user's in-app inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related: Option<RelatedRef>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related: Option<RelatedRef>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            related,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Fan-out notice to one seller about a freshly placed order, listing
    /// only that seller's items.
    pub fn new_order_for_seller(seller: UserId, order: &Order) -> Self {
        let items: Vec<String> = order
            .items_for_seller(seller)
            .map(|item| format!("{} (Qty: {})", item.product_name, item.quantity))
            .collect();
        Self::new(
            seller,
            NotificationKind::NewOrder,
            "New Order Received",
            format!("Order #{} - Products: {}", order.number, items.join(", ")),
            Some(RelatedRef::Order(order.id)),
        )
    }

    /// Buyer notice for the seller-confirm transition.
    pub fn order_confirmed(order: &Order) -> Self {
        Self::new(
            order.buyer,
            NotificationKind::OrderConfirmed,
            "Order Confirmed",
            format!("Your order #{} has been confirmed by the seller", order.number),
            Some(RelatedRef::Order(order.id)),
        )
    }

    /// Buyer notice for any other status change.
    pub fn status_updated(order: &Order, status: OrderStatus) -> Self {
        Self::new(
            order.buyer,
            NotificationKind::Order,
            "Order Status Updated",
            format!(
                "Your order #{} status has been updated to {status}",
                order.number
            ),
            Some(RelatedRef::Order(order.id)),
        )
    }
}
