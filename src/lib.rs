//! Vinyl Market Server
//! 外部カタログ由来の出品（Listing）を管理する在庫バックエンド
#![recursion_limit = "256"]

pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use db::DbPool;

/// 共有アプリケーション状態
pub struct AppState {
    pub db: DbPool,
}

/// API ルーター構築
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(
            "/api/listings",
            get(handlers::listings::list_listings).post(handlers::listings::create_listing),
        )
        .route(
            "/api/listings/:listing_id",
            get(handlers::listings::get_listing).put(handlers::listings::update_listing),
        )
        .route(
            "/api/listings/:listing_id/remove",
            post(handlers::listings::remove_listing),
        )
        .route(
            "/api/listings/:listing_id/sold",
            post(handlers::listings::mark_listing_sold),
        )
        .route("/api/stats", get(handlers::listings::get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
