//! Database Module
//! SQLite を使用した listings の管理

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::info;

/// データベース接続プール
pub type DbPool = Pool<Sqlite>;

/// データベースを初期化
pub async fn init_db(db_path: &str) -> Result<DbPool> {
    // SQLite接続文字列
    let db_url = format!("sqlite:{}?mode=rwc", db_path);

    info!("Initializing database: {}", db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // スキーマ作成
    create_schema(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// スキーマ作成
async fn create_schema(pool: &DbPool) -> Result<()> {
    // listings テーブル
    // 主キーは生成 UUID、listing_id は外部システム側の識別子（UNIQUE）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            uuid TEXT PRIMARY KEY,
            listing_id TEXT NOT NULL UNIQUE,
            status TEXT,
            condition TEXT,
            sleeve_condition TEXT,
            posted INTEGER,
            uri TEXT,
            resource_url TEXT,
            price_value REAL NOT NULL CHECK (price_value >= 0),
            price_currency TEXT,
            shipping_price REAL,
            shipping_currency TEXT,
            weight REAL,
            format_quantity INTEGER,
            external_id TEXT,
            location TEXT,
            comments TEXT,
            release_id TEXT NOT NULL,
            release_title TEXT,
            release_year INTEGER,
            release_resource_url TEXT,
            release_uri TEXT,
            artist_names TEXT,
            primary_artist TEXT,
            label_names TEXT,
            primary_label TEXT,
            format_names TEXT,
            primary_format TEXT,
            genres TEXT,
            styles TEXT,
            country TEXT,
            catalog_number TEXT,
            barcode TEXT,
            master_id TEXT,
            master_url TEXT,
            image_uri TEXT,
            image_resource_url TEXT,
            release_community_have INTEGER,
            release_community_want INTEGER,
            export_timestamp INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            removed_at INTEGER,
            sold_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            custom_metadata TEXT
        )
    "#,
    )
    .execute(pool)
    .await?;

    // インデックス作成
    // release_id は非ユニーク（同一リリースの出品が複数並ぶ）
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_release_id ON listings(release_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_is_active ON listings(is_active)")
        .execute(pool)
        .await?;

    Ok(())
}
