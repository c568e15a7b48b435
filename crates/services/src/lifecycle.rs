//! Order lifecycle manager: the single authoritative entry point for
//! status transitions.

use chrono::Utc;
use common::{Actor, OrderId};
use domain::{Notification, Order, OrderStatus, PaymentResult};
use store::{MarketStore, OrderStatusUpdate, StockDecrement};

use crate::{Result, ServiceError};

/// Drives orders through the status state machine.
pub struct LifecycleService<S> {
    store: S,
}

impl<S: MarketStore> LifecycleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Applies a seller/admin driven status change.
    ///
    /// On the `pending → confirmed` edge the acting seller's line items are
    /// deducted from stock in the same atomic unit as the status write;
    /// re-submitting an already-reached status is a no-op, so the deduction
    /// can never run twice for the same order/seller pair. Admin confirms
    /// move the status but deduct nothing — an admin owns no line items.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn transition(
        &self,
        actor: &Actor,
        order_id: OrderId,
        target: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if !actor.is_admin() && !order.has_seller(actor.user_id) {
            return Err(ServiceError::Forbidden(
                "Not authorized to update this order".to_string(),
            ));
        }

        if order.status == target {
            // Idempotent: the caller already got what it asked for.
            return Ok(order);
        }
        if !order.status.can_transition(target) {
            return Err(ServiceError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let confirming = order.status == OrderStatus::Pending && target == OrderStatus::Confirmed;

        let mut update = OrderStatusUpdate::to(target);
        update.tracking_number = tracking_number;
        if target == OrderStatus::Delivered {
            update.delivered_at = Some(Utc::now());
        }
        if confirming {
            update.decrements = order
                .items_for_seller(actor.user_id)
                .map(|item| StockDecrement {
                    product: item.product,
                    quantity: item.quantity,
                })
                .collect();
        }

        let updated = self
            .store
            .update_order_status(order_id, order.status, update)
            .await?;

        if confirming {
            self.store
                .insert_notification(&Notification::order_confirmed(&updated))
                .await?;
            metrics::counter!("orders_confirmed_total").increment(1);
        } else {
            self.store
                .insert_notification(&Notification::status_updated(&updated, target))
                .await?;
        }
        tracing::info!(order = %updated.number, status = %target, "order status changed");
        Ok(updated)
    }

    /// Records the buyer's payment result and moves the order from
    /// `pending` to `processing`.
    ///
    /// This path bypasses seller confirmation entirely, so no stock is
    /// deducted; the payment status field is left untouched.
    #[tracing::instrument(skip(self, payment_result), fields(actor = %actor.user_id))]
    pub async fn submit_payment(
        &self,
        actor: &Actor,
        order_id: OrderId,
        payment_result: PaymentResult,
    ) -> Result<Order> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.buyer != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Not authorized to update this order".to_string(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(ServiceError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Processing,
            });
        }

        let mut update = OrderStatusUpdate::to(OrderStatus::Processing);
        update.payment_result = Some(payment_result);
        let updated = self
            .store
            .update_order_status(order_id, OrderStatus::Pending, update)
            .await?;
        Ok(updated)
    }
}
