//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Store errors
//! carry a fixed public message; the underlying cause is logged, never sent.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed input.
  #[error("{0}")]
  Validation(String),

  /// The store refused the write, e.g. a duplicate id.
  #[error("{0}")]
  Conflict(String),

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("Access token required")]
  MissingToken,

  #[error("Invalid token")]
  InvalidToken,

  #[error("{message}")]
  Store {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  /// Hashing or signing failed; nothing the caller can fix.
  #[error("Server error")]
  Internal(String),
}

impl ApiError {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

  /// Build a closure for `map_err` that wraps a store error under a fixed
  /// public message.
  pub fn store<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Store { message, source: Box::new(e) }
  }

  /// Like [`ApiError::store`], but the failed write is the caller's problem:
  /// the cause is logged and a 400 carries the public message.
  pub fn rejected<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| {
      tracing::warn!(error = %e, "{message}");
      Self::Conflict(message.to_owned())
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
      Self::InvalidCredentials | Self::MissingToken => StatusCode::UNAUTHORIZED,
      Self::InvalidToken => StatusCode::FORBIDDEN,
      Self::Store { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      Self::Store { message, source } => {
        tracing::error!(error = %source, "{message}");
      }
      Self::Internal(detail) => tracing::error!("{detail}"),
      _ => {}
    }
    (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
  }
}
