//! Checkout and order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{OrderId, ProductId};
use domain::checkout::CheckoutLine;
use domain::{DeliveryAddress, OrderStatus, PaymentMethod, PaymentResult};
use serde::Deserialize;
use services::PlaceOrder;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::response::Envelope;
use crate::routes::parse_id;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub payment_result: PaymentResult,
}

/// POST /orders — place an order from explicit line items.
pub async fn create<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PlaceOrder {
        items: req
            .items
            .into_iter()
            .map(|item| CheckoutLine {
                product: item.product,
                quantity: item.quantity,
            })
            .collect(),
        delivery_address: req.delivery_address,
        payment_method: req.payment_method,
        buyer_name: req.buyer_name,
        buyer_phone: req.buyer_phone,
    };

    let order = state.checkout.place_order(&actor, request).await?;
    let message = format!("Order placed successfully! Order ID: #{}", order.number);
    Ok((StatusCode::CREATED, Envelope::with_message(order, message)))
}

/// GET /orders/my-orders — the caller's orders, newest first.
pub async fn my_orders<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.queries.buyer_orders(&actor).await?;
    Ok(Envelope::data(orders))
}

/// GET /orders/seller-orders (alias GET /seller/orders) — orders holding
/// the caller's items, filtered to the caller's slice.
pub async fn seller_orders<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.queries.seller_orders(&actor).await?;
    Ok(Envelope::data(views))
}

/// GET /orders/{id} — visible to the buyer, item sellers, and admins.
pub async fn get<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = OrderId::from_uuid(parse_id(&id)?);
    let order = state.queries.order_for(&actor, id).await?;
    Ok(Envelope::data(order))
}

/// PUT /orders/{id}/status (alias PUT /seller/orders/{id}/status) —
/// drives the order state machine.
pub async fn update_status<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = OrderId::from_uuid(parse_id(&id)?);
    let order = state
        .lifecycle
        .transition(&actor, id, req.status, req.tracking_number)
        .await?;

    let message = if req.status == OrderStatus::Confirmed {
        "Order confirmed! Stock updated."
    } else {
        "Order status updated successfully"
    };
    Ok(Envelope::with_message(order, message))
}

/// POST /orders/{id}/payment — buyer submits a payment result.
pub async fn submit_payment<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = OrderId::from_uuid(parse_id(&id)?);
    let order = state
        .lifecycle
        .submit_payment(&actor, id, req.payment_result)
        .await?;
    Ok(Envelope::data(order))
}
