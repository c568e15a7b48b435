//! The storage contract consumed by the service layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartItemId, Money, NotificationId, OrderId, ProductId, UserId};
use domain::{CartItem, Notification, Order, OrderStatus, PaymentResult, Product};

use crate::Result;

/// One conditional stock deduction: decrement by `quantity` only if the
/// product currently has at least that much stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub product: ProductId,
    pub quantity: u32,
}

/// The mutable slice of an order applied by a guarded status update.
///
/// `tracking_number`, `delivered_at`, and `payment_result` are only
/// written when `Some`; existing values are kept otherwise.
#[derive(Debug, Clone)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub decrements: Vec<StockDecrement>,
}

impl OrderStatusUpdate {
    /// An update that only moves the status.
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            tracking_number: None,
            delivered_at: None,
            payment_result: None,
            decrements: Vec::new(),
        }
    }
}

/// Persistent storage for products, carts, orders, notifications, and
/// named sequences.
///
/// Implementations must make [`next_sequence`](MarketStore::next_sequence)
/// an atomic fetch-and-increment and
/// [`update_order_status`](MarketStore::update_order_status) a single
/// atomic unit: the status write happens only if the order is still in the
/// expected status, and every stock decrement is conditional on sufficient
/// stock — any failure leaves the store untouched.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // -- Sequences --

    /// Returns the next value of the named sequence; strictly greater than
    /// every previously returned value for that name, even under
    /// concurrent callers.
    async fn next_sequence(&self, name: &str) -> Result<i64>;

    // -- Products --

    async fn insert_product(&self, product: &Product) -> Result<()>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Overwrites the full product row. Fails with `NotFound` if absent.
    async fn update_product(&self, product: &Product) -> Result<()>;

    /// Returns true if a row was deleted.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    /// A seller's products, newest first.
    async fn products_by_seller(&self, seller: UserId) -> Result<Vec<Product>>;

    // -- Cart --

    /// Inserts a cart row, or increments the quantity of the existing
    /// (buyer, product) row. The price snapshot is only stored on insert.
    /// The boolean is true when a new row was created.
    async fn add_cart_item(
        &self,
        buyer: UserId,
        product: ProductId,
        quantity: u32,
        price_snapshot: Money,
    ) -> Result<(CartItem, bool)>;

    /// A buyer's cart rows, newest first.
    async fn cart_items(&self, buyer: UserId) -> Result<Vec<CartItem>>;

    /// Sets the quantity of a row owned by the buyer. Returns `None` when
    /// the row is absent or owned by someone else.
    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        buyer: UserId,
        quantity: u32,
    ) -> Result<Option<CartItem>>;

    /// Returns true if a row owned by the buyer was deleted.
    async fn remove_cart_item(&self, id: CartItemId, buyer: UserId) -> Result<bool>;

    // -- Orders --

    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// A buyer's orders, newest first.
    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>>;

    /// Orders containing at least one item sold by the seller, newest
    /// first. Items are returned unfiltered; view shaping happens in the
    /// service layer.
    async fn orders_by_seller(&self, seller: UserId) -> Result<Vec<Order>>;

    /// Applies `update` to the order if and only if it is currently in
    /// `expected` status, executing all stock decrements in the same
    /// atomic unit.
    ///
    /// Errors: `NotFound` (no such order), `StatusConflict` (status moved
    /// under us), `InsufficientStock` (a decrement failed its guard). On
    /// any error nothing is written. Decrements whose product row has been
    /// deleted are skipped — there is nothing left to deduct.
    async fn update_order_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        update: OrderStatusUpdate,
    ) -> Result<Order>;

    // -- Notifications --

    async fn insert_notification(&self, notification: &Notification) -> Result<()>;

    /// A recipient's notifications, newest first, capped at `limit`.
    async fn notifications(&self, recipient: UserId, limit: i64) -> Result<Vec<Notification>>;

    async fn unread_count(&self, recipient: UserId) -> Result<u64>;

    /// Marks one notification read. Returns `None` when absent or owned by
    /// someone else.
    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> Result<Option<Notification>>;

    /// Marks all of the recipient's notifications read, returning how many
    /// rows changed.
    async fn mark_all_read(&self, recipient: UserId) -> Result<u64>;

    /// Returns true if a row owned by the recipient was deleted.
    async fn delete_notification(&self, id: NotificationId, recipient: UserId) -> Result<bool>;

    /// Deletes all of the recipient's notifications, returning the count.
    async fn clear_notifications(&self, recipient: UserId) -> Result<u64>;
}
