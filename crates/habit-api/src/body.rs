//! JSON body extractor whose rejections use the API error shape.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like [`axum::Json`], but a malformed body yields a 400
/// `{"error": ...}` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
