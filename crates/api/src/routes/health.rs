//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
}

/// GET /health — confirms the service is up.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Marketplace API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}
