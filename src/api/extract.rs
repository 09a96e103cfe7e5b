use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// `Json` の代わりに使うリクエストボディ抽出器
///
/// 不正なJSONも他のエラーと同じ `ErrorResponse` 形式で返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// クエリ文字列の抽出器
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// パスパラメータの抽出器
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);
