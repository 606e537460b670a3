//! Storage Error Types
//! コミット時に返る整合性エラーの分類

use axum::http::StatusCode;
use thiserror::Error;

/// listings テーブル操作のエラー
///
/// 整合性違反はすべてコミット時に同期的に返り、呼び出し側で
/// リトライ可能（プロセスを落とすものは無い）。
#[derive(Debug, Error)]
pub enum StoreError {
    /// listing_id / uuid の重複
    #[error("unique constraint violation: {0}")]
    Conflict(String),

    /// price_value < 0 などの CHECK 制約違反
    #[error("check constraint violation: {0}")]
    CheckViolation(String),

    /// 必須カラムの欠落
    #[error("not-null constraint violation: {0}")]
    NotNullViolation(String),

    #[error("listing not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// HTTP ステータスへのマッピング
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::CheckViolation(_) | StoreError::NotNullViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// SQLite extended result codes:
//   1555 = SQLITE_CONSTRAINT_PRIMARYKEY, 2067 = SQLITE_CONSTRAINT_UNIQUE,
//   275 = SQLITE_CONSTRAINT_CHECK, 1299 = SQLITE_CONSTRAINT_NOTNULL
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some("1555") | Some("2067") => return StoreError::Conflict(message),
                Some("275") => return StoreError::CheckViolation(message),
                Some("1299") => return StoreError::NotNullViolation(message),
                _ => {}
            }
            // 拡張コードが取れないドライバ構成向けにメッセージでも判定する
            if message.contains("UNIQUE constraint failed") {
                return StoreError::Conflict(message);
            }
            if message.contains("CHECK constraint failed") {
                return StoreError::CheckViolation(message);
            }
            if message.contains("NOT NULL constraint failed") {
                return StoreError::NotNullViolation(message);
            }
        }
        StoreError::Database(e)
    }
}
