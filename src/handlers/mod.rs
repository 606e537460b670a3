//! API Handlers

pub mod listings;

use axum::response::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// ヘルスチェック
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "vinyl-market-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
