//! Order record and related types.

mod number;
mod status;
mod value_objects;

pub use number::OrderNumber;
pub use status::OrderStatus;
pub use value_objects::{DeliveryAddress, OrderItem, PaymentMethod, PaymentResult, PaymentStatus};

use chrono::{DateTime, Utc};
use common::{Actor, Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

/// Input for creating an order. Totals and status are derived, never
/// supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub buyer: UserId,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
}

/// An immutable order snapshot.
///
/// Items and the price breakdown are frozen at creation; only status,
/// tracking number, delivered-at, and the payment result mutate afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "order_number")]
    pub number: OrderNumber,
    pub buyer: UserId,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_result: Option<PaymentResult>,
    pub items_price: Money,
    pub tax_price: Money,
    pub shipping_price: Money,
    pub total_price: Money,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order, computing the price breakdown from its items.
    ///
    /// Tax and shipping are currently always zero; the total therefore
    /// equals the item sum. The breakdown fields stay separate so the
    /// pricing policy can change without a schema change.
    pub fn create(new: NewOrder) -> Self {
        let items_price: Money = new.items.iter().map(OrderItem::line_total).sum();
        let tax_price = Money::zero();
        let shipping_price = Money::zero();
        Self {
            id: OrderId::new(),
            number: new.number,
            buyer: new.buyer,
            buyer_name: new.buyer_name,
            buyer_phone: new.buyer_phone,
            items: new.items,
            delivery_address: new.delivery_address,
            payment_method: new.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_result: None,
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price + tax_price + shipping_price,
            status: OrderStatus::Pending,
            tracking_number: None,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    /// Distinct sellers represented in this order, in first-seen item order.
    pub fn seller_ids(&self) -> Vec<UserId> {
        let mut sellers = Vec::new();
        for item in &self.items {
            if !sellers.contains(&item.seller) {
                sellers.push(item.seller);
            }
        }
        sellers
    }

    /// Items belonging to the given seller.
    pub fn items_for_seller(&self, seller: UserId) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(move |item| item.seller == seller)
    }

    /// Returns true if the user sold at least one item in this order.
    pub fn has_seller(&self, user: UserId) -> bool {
        self.items.iter().any(|item| item.seller == user)
    }

    /// Total over the given seller's items only.
    pub fn seller_total(&self, seller: UserId) -> Money {
        self.items_for_seller(seller).map(OrderItem::line_total).sum()
    }

    /// Whether the actor may see this order: its buyer, any of its item
    /// sellers, or an admin.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        actor.is_admin() || self.buyer == actor.user_id || self.has_seller(actor.user_id)
    }
}
