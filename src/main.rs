use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use vinyl_market_server::{api_router, db, AppState};

// ========================================
// 設定
// ========================================

struct AppConfig {
    database_path: String,
    bind_addr: String,
}

impl AppConfig {
    fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/listings.db".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

// ========================================
// メイン
// ========================================

#[tokio::main]
async fn main() -> Result<()> {
    // ログ初期化
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let pool = db::init_db(&config.database_path).await?;
    let state = Arc::new(AppState { db: pool });

    let app = api_router(state);

    info!("🚀 Vinyl Market API Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
