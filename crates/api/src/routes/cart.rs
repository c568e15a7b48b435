//! Cart endpoints, all scoped to the authenticated buyer.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{CartItemId, ProductId};
use serde::Deserialize;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::response::Envelope;
use crate::routes::parse_id;

#[derive(Deserialize)]
pub struct AddCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// POST /cart — add a product, incrementing an existing row. 201 when a
/// new row was created, 200 when incremented.
pub async fn add<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Json(req): Json<AddCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (item, created) = state.cart.add(&actor, req.product_id, req.quantity).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Envelope::data(item)))
}

/// GET /cart/my — the caller's cart rows with current product data.
pub async fn list<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state.cart.list(&actor).await?;
    Ok(Envelope::data(lines))
}

/// PUT /cart/{id} — overwrite a row's quantity.
pub async fn update<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CartItemId::from_uuid(parse_id(&id)?);
    let item = state.cart.set_quantity(&actor, id, req.quantity).await?;
    Ok(Envelope::data(item))
}

/// DELETE /cart/{id} — remove a row.
pub async fn remove<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CartItemId::from_uuid(parse_id(&id)?);
    state.cart.remove(&actor, id).await?;
    Ok(Envelope::message_only("Cart item removed"))
}
