//! Catalog endpoints: public product reads plus seller CRUD.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ProductId;
use services::{NewProductInput, ProductPatch};
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::response::Envelope;
use crate::routes::parse_id;

/// GET /products/{id} — any product by id.
pub async fn get<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProductId::from_uuid(parse_id(&id)?);
    let product = state.catalog.get(id).await?;
    Ok(Envelope::data(product))
}

/// POST /seller/products — list a new product.
pub async fn create<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Json(input): Json<NewProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog.create(&actor, input).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::with_message(product, "Product created successfully"),
    ))
}

/// GET /seller/products — the caller's products, newest first.
pub async fn list_own<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.catalog.list_own(&actor).await?;
    Ok(Envelope::data(products))
}

/// PUT /seller/products/{id} — owner-only partial update.
pub async fn update<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProductId::from_uuid(parse_id(&id)?);
    let product = state.catalog.update(&actor, id, patch).await?;
    Ok(Envelope::with_message(product, "Product updated successfully"))
}

/// DELETE /seller/products/{id} — owner-only delete.
pub async fn remove<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProductId::from_uuid(parse_id(&id)?);
    state.catalog.delete(&actor, id).await?;
    Ok(Envelope::message_only("Product deleted successfully"))
}
