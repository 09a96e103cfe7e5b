use crate::application::library::LibraryError;
use crate::domain::ValidationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// どの事前条件に違反したかはエラーコードで区別できる。
#[derive(Debug)]
pub enum ApiError {
    Library(LibraryError),
    Validation(ValidationError),
    BadRequest(String),
    /// 図書館の状態を保護するロックが汚染された
    StatePoisoned,
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        ApiError::Library(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

// 抽出器のリジェクションは400として返す
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found - 登録されていない書籍・会員
            ApiError::Library(ref err @ LibraryError::BookNotRegistered(_)) => (
                StatusCode::NOT_FOUND,
                "BOOK_NOT_REGISTERED",
                err.to_string(),
            ),
            ApiError::Library(ref err @ LibraryError::MemberNotRegistered(_)) => (
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_REGISTERED",
                err.to_string(),
            ),

            // 409 Conflict - 貸出ルール違反
            ApiError::Library(ref err @ LibraryError::BookUnavailable(_)) => (
                StatusCode::CONFLICT,
                "BOOK_UNAVAILABLE",
                err.to_string(),
            ),
            ApiError::Library(ref err @ LibraryError::BorrowLimitExceeded { .. }) => (
                StatusCode::CONFLICT,
                "BORROW_LIMIT_EXCEEDED",
                err.to_string(),
            ),
            ApiError::Library(ref err @ LibraryError::BookNotBorrowedByMember { .. }) => (
                StatusCode::CONFLICT,
                "BOOK_NOT_BORROWED_BY_MEMBER",
                err.to_string(),
            ),

            // 422 Unprocessable Entity - 入力値の検証エラー
            ApiError::Validation(ref err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                err.to_string(),
            ),

            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),

            // 500 Internal Server Error
            ApiError::StatePoisoned => {
                tracing::error!("Library state lock is poisoned");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STATE_UNAVAILABLE",
                    "Library state is unavailable".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
