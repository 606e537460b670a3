//! Listing Storage Operations
//! listings テーブルへの CRUD / 論理削除 / 集計

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{
    ms_to_iso8601, CreateListingRequest, InventoryStats, Listing, UpdateListingRequest,
};

/// 一覧取得のフィルタ条件
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// is_active = true の行のみ返す
    pub active_only: bool,
    /// 同一リリースの出品に絞る
    pub release_id: Option<String>,
    /// タイトル / アーティスト名の部分一致
    pub query: Option<String>,
}

// ========================================
// Create
// ========================================

/// Listing を新規作成する
///
/// uuid 未指定なら v4 を生成、is_active 未指定なら true。
/// created_at / updated_at は現在時刻(UTC)で揃える。
/// listing_id 重複・price_value 負値・必須カラム欠落は INSERT 時の
/// 整合性エラーとして返る。
pub async fn insert_listing(
    pool: &DbPool,
    req: &CreateListingRequest,
) -> Result<Listing, StoreError> {
    let uuid = req
        .uuid
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let now_ms = Utc::now().timestamp_millis();
    let metadata_json = req.custom_metadata.as_ref().map(|v| v.to_string());

    sqlx::query(
        r#"
        INSERT INTO listings (
            uuid, listing_id, status, condition, sleeve_condition,
            posted, uri, resource_url, price_value, price_currency,
            shipping_price, shipping_currency, weight, format_quantity, external_id,
            location, comments, release_id, release_title, release_year,
            release_resource_url, release_uri, artist_names, primary_artist, label_names,
            primary_label, format_names, primary_format, genres, styles,
            country, catalog_number, barcode, master_id, master_url,
            image_uri, image_resource_url, release_community_have, release_community_want, export_timestamp,
            is_active, removed_at, sold_at, created_at, updated_at,
            custom_metadata
        ) VALUES (
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?
        )
    "#,
    )
    .bind(&uuid)
    .bind(&req.listing_id)
    .bind(&req.status)
    .bind(&req.condition)
    .bind(&req.sleeve_condition)
    .bind(req.posted.map(|t| t.timestamp_millis()))
    .bind(&req.uri)
    .bind(&req.resource_url)
    .bind(req.price_value)
    .bind(&req.price_currency)
    .bind(req.shipping_price)
    .bind(&req.shipping_currency)
    .bind(req.weight)
    .bind(req.format_quantity)
    .bind(&req.external_id)
    .bind(&req.location)
    .bind(&req.comments)
    .bind(&req.release_id)
    .bind(&req.release_title)
    .bind(req.release_year)
    .bind(&req.release_resource_url)
    .bind(&req.release_uri)
    .bind(&req.artist_names)
    .bind(&req.primary_artist)
    .bind(&req.label_names)
    .bind(&req.primary_label)
    .bind(&req.format_names)
    .bind(&req.primary_format)
    .bind(&req.genres)
    .bind(&req.styles)
    .bind(&req.country)
    .bind(&req.catalog_number)
    .bind(&req.barcode)
    .bind(&req.master_id)
    .bind(&req.master_url)
    .bind(&req.image_uri)
    .bind(&req.image_resource_url)
    .bind(req.release_community_have)
    .bind(req.release_community_want)
    .bind(req.export_timestamp.map(|t| t.timestamp_millis()))
    .bind(req.is_active.unwrap_or(true))
    .bind(req.removed_at.map(|t| t.timestamp_millis()))
    .bind(req.sold_at.map(|t| t.timestamp_millis()))
    .bind(now_ms)
    .bind(now_ms)
    .bind(&metadata_json)
    .execute(pool)
    .await
    .map_err(StoreError::from)?;

    info!(
        "Listing created: listing_id={}, uuid={}",
        req.listing_id, uuid
    );

    require_by_uuid(pool, &uuid).await
}

// ========================================
// Read
// ========================================

/// uuid（主キー）で 1 件取得
pub async fn get_by_uuid(pool: &DbPool, uuid: &str) -> Result<Option<Listing>, StoreError> {
    sqlx::query_as("SELECT * FROM listings WHERE uuid = ?")
        .bind(uuid)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
}

/// 外部システム側の listing_id で 1 件取得
pub async fn get_by_listing_id(
    pool: &DbPool,
    listing_id: &str,
) -> Result<Option<Listing>, StoreError> {
    sqlx::query_as("SELECT * FROM listings WHERE listing_id = ?")
        .bind(listing_id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
}

/// 一覧取得（掲載日降順、掲載日未設定の行は後ろ）
pub async fn list_listings(
    pool: &DbPool,
    filter: &ListingFilter,
) -> Result<Vec<Listing>, StoreError> {
    let listings: Vec<Listing> = match (&filter.release_id, filter.active_only) {
        (Some(release_id), true) => {
            sqlx::query_as(
                "SELECT * FROM listings WHERE release_id = ? AND is_active = 1 \
                 ORDER BY posted DESC, created_at DESC",
            )
            .bind(release_id)
            .fetch_all(pool)
            .await
        }
        (Some(release_id), false) => {
            sqlx::query_as(
                "SELECT * FROM listings WHERE release_id = ? \
                 ORDER BY posted DESC, created_at DESC",
            )
            .bind(release_id)
            .fetch_all(pool)
            .await
        }
        (None, true) => {
            sqlx::query_as(
                "SELECT * FROM listings WHERE is_active = 1 \
                 ORDER BY posted DESC, created_at DESC",
            )
            .fetch_all(pool)
            .await
        }
        (None, false) => {
            sqlx::query_as("SELECT * FROM listings ORDER BY posted DESC, created_at DESC")
                .fetch_all(pool)
                .await
        }
    }
    .map_err(StoreError::from)?;

    // タイトル / アーティストの部分一致はここで絞る
    let listings = match &filter.query {
        Some(q) => {
            let needle = q.to_lowercase();
            listings
                .into_iter()
                .filter(|l| {
                    l.release_title
                        .as_deref()
                        .map_or(false, |t| t.to_lowercase().contains(&needle))
                        || l.artist_names
                            .as_deref()
                            .map_or(false, |a| a.to_lowercase().contains(&needle))
                })
                .collect()
        }
        None => listings,
    };

    Ok(listings)
}

// ========================================
// Update
// ========================================

/// 指定フィールドのみ更新し updated_at を進める
///
/// uuid / listing_id / created_at は変更しない。
pub async fn update_listing(
    pool: &DbPool,
    listing_id: &str,
    req: &UpdateListingRequest,
) -> Result<Listing, StoreError> {
    let now_ms = Utc::now().timestamp_millis();
    let metadata_json = req.custom_metadata.as_ref().map(|v| v.to_string());

    let result = sqlx::query(
        r#"
        UPDATE listings SET
            status = COALESCE(?, status),
            condition = COALESCE(?, condition),
            sleeve_condition = COALESCE(?, sleeve_condition),
            price_value = COALESCE(?, price_value),
            price_currency = COALESCE(?, price_currency),
            shipping_price = COALESCE(?, shipping_price),
            shipping_currency = COALESCE(?, shipping_currency),
            weight = COALESCE(?, weight),
            format_quantity = COALESCE(?, format_quantity),
            location = COALESCE(?, location),
            comments = COALESCE(?, comments),
            custom_metadata = COALESCE(?, custom_metadata),
            updated_at = ?
        WHERE listing_id = ?
    "#,
    )
    .bind(&req.status)
    .bind(&req.condition)
    .bind(&req.sleeve_condition)
    .bind(req.price_value)
    .bind(&req.price_currency)
    .bind(req.shipping_price)
    .bind(&req.shipping_currency)
    .bind(req.weight)
    .bind(req.format_quantity)
    .bind(&req.location)
    .bind(&req.comments)
    .bind(&metadata_json)
    .bind(now_ms)
    .bind(listing_id)
    .execute(pool)
    .await
    .map_err(StoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(listing_id.to_string()));
    }

    info!("Listing updated: listing_id={}", listing_id);

    require_by_listing_id(pool, listing_id).await
}

// ========================================
// Soft Delete
// ========================================

/// 出品取り下げ: is_active=false, removed_at=now（sold_at は触らない）
pub async fn mark_removed(pool: &DbPool, listing_id: &str) -> Result<Listing, StoreError> {
    let now_ms = Utc::now().timestamp_millis();

    let result = sqlx::query(
        "UPDATE listings SET is_active = 0, removed_at = ?, updated_at = ? WHERE listing_id = ?",
    )
    .bind(now_ms)
    .bind(now_ms)
    .bind(listing_id)
    .execute(pool)
    .await
    .map_err(StoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(listing_id.to_string()));
    }

    info!("Listing removed: listing_id={}", listing_id);

    require_by_listing_id(pool, listing_id).await
}

/// 売約済み: is_active=false, sold_at=now（removed_at は触らない）
pub async fn mark_sold(pool: &DbPool, listing_id: &str) -> Result<Listing, StoreError> {
    let now_ms = Utc::now().timestamp_millis();

    let result = sqlx::query(
        "UPDATE listings SET is_active = 0, sold_at = ?, updated_at = ? WHERE listing_id = ?",
    )
    .bind(now_ms)
    .bind(now_ms)
    .bind(listing_id)
    .execute(pool)
    .await
    .map_err(StoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(listing_id.to_string()));
    }

    info!("Listing sold: listing_id={}", listing_id);

    require_by_listing_id(pool, listing_id).await
}

// ========================================
// Stats
// ========================================

/// 在庫統計（総数と最終更新時刻）
pub async fn stats(pool: &DbPool) -> Result<InventoryStats, StoreError> {
    let row: (i64, Option<i64>) = sqlx::query_as("SELECT COUNT(*), MAX(updated_at) FROM listings")
        .fetch_one(pool)
        .await
        .map_err(StoreError::from)?;

    Ok(InventoryStats {
        total_listings: row.0,
        last_updated: ms_to_iso8601(row.1),
    })
}

// ========================================
// Helper Functions
// ========================================

async fn require_by_uuid(pool: &DbPool, uuid: &str) -> Result<Listing, StoreError> {
    get_by_uuid(pool, uuid)
        .await?
        .ok_or_else(|| StoreError::NotFound(uuid.to_string()))
}

async fn require_by_listing_id(pool: &DbPool, listing_id: &str) -> Result<Listing, StoreError> {
    get_by_listing_id(pool, listing_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(listing_id.to_string()))
}
