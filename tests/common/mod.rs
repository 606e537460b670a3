//! テスト共通フィクスチャ

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use vinyl_market_server::db::{self, DbPool};
use vinyl_market_server::models::CreateListingRequest;
use vinyl_market_server::{api_router, AppState};

/// テスト用の一時ファイル DB を作る
pub async fn setup_db() -> (DbPool, TempDir) {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("listings.db");
    let pool = db::init_db(db_path.to_str().unwrap()).await.unwrap();
    (pool, tmp)
}

/// 必須フィールドのみの作成リクエスト
#[allow(dead_code)]
pub fn minimal_listing(listing_id: &str, price_value: f64, release_id: &str) -> CreateListingRequest {
    CreateListingRequest {
        uuid: None,
        listing_id: listing_id.to_string(),
        status: None,
        condition: None,
        sleeve_condition: None,
        posted: None,
        uri: None,
        resource_url: None,
        price_value,
        price_currency: None,
        shipping_price: None,
        shipping_currency: None,
        weight: None,
        format_quantity: None,
        external_id: None,
        location: None,
        comments: None,
        release_id: release_id.to_string(),
        release_title: None,
        release_year: None,
        release_resource_url: None,
        release_uri: None,
        artist_names: None,
        primary_artist: None,
        label_names: None,
        primary_label: None,
        format_names: None,
        primary_format: None,
        genres: None,
        styles: None,
        country: None,
        catalog_number: None,
        barcode: None,
        master_id: None,
        master_url: None,
        image_uri: None,
        image_resource_url: None,
        release_community_have: None,
        release_community_want: None,
        export_timestamp: None,
        is_active: None,
        removed_at: None,
        sold_at: None,
        custom_metadata: None,
    }
}

/// ルーター越しにテストするための軽量アプリ
#[allow(dead_code)]
pub struct TestApp {
    pub pool: DbPool,
    router: Router,
    _tmp: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let (pool, tmp) = setup_db().await;
        let state = Arc::new(AppState { db: pool.clone() });
        let router = api_router(state);
        Self {
            pool,
            router,
            _tmp: tmp,
        }
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response")
    }

    pub async fn post_json(&self, path: &str, payload: &Value) -> Response<Body> {
        self.send_json(Method::POST, path, payload).await
    }

    pub async fn put_json(&self, path: &str, payload: &Value) -> Response<Body> {
        self.send_json(Method::PUT, path, payload).await
    }

    pub async fn post_empty(&self, path: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response")
    }

    async fn send_json(&self, method: Method, path: &str, payload: &Value) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(payload).unwrap()))
            .unwrap();
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response")
    }
}

/// レスポンスボディを JSON として読む
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// ステータスを検証してから JSON を返す
#[allow(dead_code)]
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
