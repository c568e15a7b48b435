//! HTTP API server for the marketplace.
//!
//! REST endpoints for checkout, order lifecycle, carts, the seller
//! catalog, and notification inboxes, with structured logging (tracing)
//! and Prometheus metrics. Authentication happens upstream; handlers read
//! the caller identity from trusted gateway headers.

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use services::{
    CartService, CatalogService, CheckoutService, LifecycleService, NotificationService,
    OrderQueries,
};
use store::MarketStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MarketStore> {
    pub checkout: CheckoutService<S>,
    pub lifecycle: LifecycleService<S>,
    pub cart: CartService<S>,
    pub catalog: CatalogService<S>,
    pub notifications: NotificationService<S>,
    pub queries: OrderQueries<S>,
}

/// Wires every service to the given store backend.
pub fn create_state<S: MarketStore + Clone>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        checkout: CheckoutService::new(store.clone()),
        lifecycle: LifecycleService::new(store.clone()),
        cart: CartService::new(store.clone()),
        catalog: CatalogService::new(store.clone()),
        notifications: NotificationService::new(store.clone()),
        queries: OrderQueries::new(store),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: MarketStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/my-orders", get(routes::orders::my_orders::<S>))
        .route(
            "/orders/seller-orders",
            get(routes::orders::seller_orders::<S>),
        )
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<S>))
        .route(
            "/orders/{id}/payment",
            post(routes::orders::submit_payment::<S>),
        )
        // The seller-prefixed aliases dispatch to the same handlers; there
        // is one lifecycle, not two.
        .route("/seller/orders", get(routes::orders::seller_orders::<S>))
        .route(
            "/seller/orders/{id}/status",
            put(routes::orders::update_status::<S>),
        )
        .route("/cart", post(routes::cart::add::<S>))
        .route("/cart/my", get(routes::cart::list::<S>))
        .route(
            "/cart/{id}",
            put(routes::cart::update::<S>).delete(routes::cart::remove::<S>),
        )
        .route(
            "/notifications",
            get(routes::notifications::list::<S>).delete(routes::notifications::clear::<S>),
        )
        .route(
            "/notifications/read-all",
            put(routes::notifications::read_all::<S>),
        )
        .route(
            "/notifications/{id}/read",
            put(routes::notifications::read::<S>),
        )
        .route(
            "/notifications/{id}",
            delete(routes::notifications::remove::<S>),
        )
        .route(
            "/seller/products",
            post(routes::products::create::<S>).get(routes::products::list_own::<S>),
        )
        .route(
            "/seller/products/{id}",
            put(routes::products::update::<S>).delete(routes::products::remove::<S>),
        )
        .route("/products/{id}", get(routes::products::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
