//! Domain model for the marketplace.
//!
//! Pure types and rules, no IO: catalog products, cart rows, the order
//! record with its status state machine, checkout validation, and
//! notification construction. Persistence lives in the `store` crate and
//! orchestration in `services`.

pub mod cart;
pub mod checkout;
pub mod notification;
pub mod order;
pub mod product;

pub use cart::CartItem;
pub use checkout::{CheckoutError, CheckoutLine};
pub use notification::{Notification, NotificationKind, RelatedRef};
pub use order::{
    DeliveryAddress, NewOrder, Order, OrderItem, OrderNumber, OrderStatus, PaymentMethod,
    PaymentResult, PaymentStatus,
};
pub use product::Product;
