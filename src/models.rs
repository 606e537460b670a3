//! Data Models
//! Listing（出品）のデータ構造定義

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ========================================
// Listing
// ========================================

/// Listing (DB row)
///
/// 外部カタログから書き込み時にコピーされた release/artist/label
/// 情報を非正規化して 1 行に持つ。日時カラムは全てエポックミリ秒(UTC)。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub uuid: String,
    pub listing_id: String,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub sleeve_condition: Option<String>,
    pub posted: Option<i64>,
    pub uri: Option<String>,
    pub resource_url: Option<String>,
    pub price_value: f64,
    pub price_currency: Option<String>,
    pub shipping_price: Option<f64>,
    pub shipping_currency: Option<String>,
    pub weight: Option<f64>,
    pub format_quantity: Option<i64>,
    pub external_id: Option<String>,
    pub location: Option<String>,
    pub comments: Option<String>,
    // 非正規化されたカタログ情報
    pub release_id: String,
    pub release_title: Option<String>,
    pub release_year: Option<i64>,
    pub release_resource_url: Option<String>,
    pub release_uri: Option<String>,
    pub artist_names: Option<String>,
    pub primary_artist: Option<String>,
    pub label_names: Option<String>,
    pub primary_label: Option<String>,
    pub format_names: Option<String>,
    pub primary_format: Option<String>,
    pub genres: Option<String>,
    pub styles: Option<String>,
    pub country: Option<String>,
    pub catalog_number: Option<String>,
    pub barcode: Option<String>,
    pub master_id: Option<String>,
    pub master_url: Option<String>,
    pub image_uri: Option<String>,
    pub image_resource_url: Option<String>,
    pub release_community_have: Option<i64>,
    pub release_community_want: Option<i64>,
    pub export_timestamp: Option<i64>,
    // 論理削除
    pub is_active: bool,
    pub removed_at: Option<i64>,
    pub sold_at: Option<i64>,
    // 監査タイムスタンプ
    pub created_at: i64,
    pub updated_at: i64,
    // スキーマレスな付加情報（JSON ドキュメントを TEXT で保持）
    pub custom_metadata: Option<String>,
}

impl Listing {
    /// 全フィールドを JSON オブジェクトに変換する
    ///
    /// 日時カラムは ISO-8601 文字列（未設定なら null、キーは常に出す）、
    /// custom_metadata は保存された JSON ドキュメントをそのまま返す。
    pub fn to_dict(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "listing_id": self.listing_id,
            "status": self.status,
            "condition": self.condition,
            "sleeve_condition": self.sleeve_condition,
            "posted": ms_to_iso8601(self.posted),
            "uri": self.uri,
            "resource_url": self.resource_url,
            "price_value": self.price_value,
            "price_currency": self.price_currency,
            "shipping_price": self.shipping_price,
            "shipping_currency": self.shipping_currency,
            "weight": self.weight,
            "format_quantity": self.format_quantity,
            "external_id": self.external_id,
            "location": self.location,
            "comments": self.comments,
            "release_id": self.release_id,
            "release_title": self.release_title,
            "release_year": self.release_year,
            "release_resource_url": self.release_resource_url,
            "release_uri": self.release_uri,
            "artist_names": self.artist_names,
            "primary_artist": self.primary_artist,
            "label_names": self.label_names,
            "primary_label": self.primary_label,
            "format_names": self.format_names,
            "primary_format": self.primary_format,
            "genres": self.genres,
            "styles": self.styles,
            "country": self.country,
            "catalog_number": self.catalog_number,
            "barcode": self.barcode,
            "master_id": self.master_id,
            "master_url": self.master_url,
            "image_uri": self.image_uri,
            "image_resource_url": self.image_resource_url,
            "release_community_have": self.release_community_have,
            "release_community_want": self.release_community_want,
            "export_timestamp": ms_to_iso8601(self.export_timestamp),
            "is_active": self.is_active,
            "removed_at": ms_to_iso8601(self.removed_at),
            "sold_at": ms_to_iso8601(self.sold_at),
            "created_at": ms_to_iso8601(Some(self.created_at)),
            "updated_at": ms_to_iso8601(Some(self.updated_at)),
            "custom_metadata": self.metadata_value(),
        })
    }

    /// custom_metadata カラムを JSON 値として取り出す（未設定なら null）
    pub fn metadata_value(&self) -> Value {
        self.custom_metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or(Value::Null)
    }

    /// 論理削除の整合性チェック
    ///
    /// is_active=false のとき removed_at / sold_at のどちらかが立っているか。
    /// スキーマ制約ではなくアプリケーション側の規約。
    pub fn soft_delete_consistent(&self) -> bool {
        self.is_active || self.removed_at.is_some() || self.sold_at.is_some()
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Listing {}: {} by {}",
            self.listing_id,
            self.release_title.as_deref().unwrap_or("None"),
            self.primary_artist.as_deref().unwrap_or("None"),
        )
    }
}

/// エポックミリ秒を ISO-8601 文字列へ変換する
pub fn ms_to_iso8601(ms: Option<i64>) -> Option<String> {
    ms.and_then(|v| Utc.timestamp_millis_opt(v).single())
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ========================================
// Requests
// ========================================

/// Listing 作成リクエスト
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    pub uuid: Option<String>, // 指定しない場合は自動生成
    pub listing_id: String,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub sleeve_condition: Option<String>,
    pub posted: Option<DateTime<Utc>>,
    pub uri: Option<String>,
    pub resource_url: Option<String>,
    pub price_value: f64,
    pub price_currency: Option<String>,
    pub shipping_price: Option<f64>,
    pub shipping_currency: Option<String>,
    pub weight: Option<f64>,
    pub format_quantity: Option<i64>,
    pub external_id: Option<String>,
    pub location: Option<String>,
    pub comments: Option<String>,
    pub release_id: String,
    pub release_title: Option<String>,
    pub release_year: Option<i64>,
    pub release_resource_url: Option<String>,
    pub release_uri: Option<String>,
    pub artist_names: Option<String>,
    pub primary_artist: Option<String>,
    pub label_names: Option<String>,
    pub primary_label: Option<String>,
    pub format_names: Option<String>,
    pub primary_format: Option<String>,
    pub genres: Option<String>,
    pub styles: Option<String>,
    pub country: Option<String>,
    pub catalog_number: Option<String>,
    pub barcode: Option<String>,
    pub master_id: Option<String>,
    pub master_url: Option<String>,
    pub image_uri: Option<String>,
    pub image_resource_url: Option<String>,
    pub release_community_have: Option<i64>,
    pub release_community_want: Option<i64>,
    pub export_timestamp: Option<DateTime<Utc>>,
    pub is_active: Option<bool>, // 省略時は true
    pub removed_at: Option<DateTime<Utc>>,
    pub sold_at: Option<DateTime<Utc>>,
    pub custom_metadata: Option<Value>,
}

/// Listing 更新リクエスト（指定フィールドのみ反映）
///
/// custom_metadata はドキュメント全体の差し替えのみ。部分変更は不可。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateListingRequest {
    pub status: Option<String>,
    pub condition: Option<String>,
    pub sleeve_condition: Option<String>,
    pub price_value: Option<f64>,
    pub price_currency: Option<String>,
    pub shipping_price: Option<f64>,
    pub shipping_currency: Option<String>,
    pub weight: Option<f64>,
    pub format_quantity: Option<i64>,
    pub location: Option<String>,
    pub comments: Option<String>,
    pub custom_metadata: Option<Value>,
}

// ========================================
// Stats
// ========================================

/// 在庫統計
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStats {
    pub total_listings: i64,
    pub last_updated: Option<String>,
}
