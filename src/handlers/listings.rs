//! Listings API Handlers
//! /api/listings エンドポイント

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::StoreError;
use crate::models::{CreateListingRequest, UpdateListingRequest};
use crate::store::{self, ListingFilter};
use crate::AppState;

// ========================================
// Response Types
// ========================================

#[derive(Serialize)]
pub struct ListingListResponse {
    pub success: bool,
    pub listings: Vec<Value>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ListingDetailResponse {
    pub success: bool,
    pub listing: Value,
}

#[derive(Serialize)]
pub struct ListingMutationResponse {
    pub success: bool,
    pub listing_id: String,
    pub uuid: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub total_listings: i64,
    pub last_updated: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

// ========================================
// Query Parameters
// ========================================

#[derive(Debug, Deserialize)]
pub struct ListListingsQuery {
    pub active: Option<bool>,
    pub release_id: Option<String>,
    pub q: Option<String>,
}

// ========================================
// Handlers
// ========================================

/// GET /api/listings - Listing一覧取得
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListListingsQuery>,
) -> Result<Json<ListingListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = ListingFilter {
        active_only: query.active.unwrap_or(false),
        release_id: query.release_id,
        query: query.q,
    };

    let listings = store::list_listings(&state.db, &filter)
        .await
        .map_err(error_response)?;

    let listings: Vec<Value> = listings.iter().map(|l| l.to_dict()).collect();
    let total = listings.len();

    Ok(Json(ListingListResponse {
        success: true,
        listings,
        total,
    }))
}

/// GET /api/listings/:listing_id - Listing詳細取得
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = store::get_by_listing_id(&state.db, &listing_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(StoreError::NotFound(listing_id.clone())))?;

    Ok(Json(ListingDetailResponse {
        success: true,
        listing: listing.to_dict(),
    }))
}

/// POST /api/listings - Listing作成
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateListingRequest>,
) -> Result<Json<ListingMutationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = store::insert_listing(&state.db, &req)
        .await
        .map_err(error_response)?;

    Ok(Json(ListingMutationResponse {
        success: true,
        listing_id: listing.listing_id,
        uuid: listing.uuid,
    }))
}

/// PUT /api/listings/:listing_id - Listing更新
pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<ListingMutationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = store::update_listing(&state.db, &listing_id, &req)
        .await
        .map_err(error_response)?;

    Ok(Json(ListingMutationResponse {
        success: true,
        listing_id: listing.listing_id,
        uuid: listing.uuid,
    }))
}

/// POST /api/listings/:listing_id/remove - 出品取り下げ（論理削除）
pub async fn remove_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = store::mark_removed(&state.db, &listing_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ListingDetailResponse {
        success: true,
        listing: listing.to_dict(),
    }))
}

/// POST /api/listings/:listing_id/sold - 売約済み（論理削除）
pub async fn mark_listing_sold(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = store::mark_sold(&state.db, &listing_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ListingDetailResponse {
        success: true,
        listing: listing.to_dict(),
    }))
}

/// GET /api/stats - 在庫統計
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stats = store::stats(&state.db).await.map_err(error_response)?;

    Ok(Json(StatsResponse {
        success: true,
        total_listings: stats.total_listings,
        last_updated: stats.last_updated,
    }))
}

// ========================================
// Error Response Helper
// ========================================

fn error_response(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    warn!("API Error: {}", e);
    (
        e.status(),
        Json(ErrorResponse {
            success: false,
            error: e.to_string(),
        }),
    )
}
