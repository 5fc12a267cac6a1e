//! JSON REST API for the habit tracker.
//!
//! Exposes an axum [`Router`] backed by any [`habit_core::store::HabitStore`].
//! Every route except `/health` and the `/auth` family requires a bearer
//! token issued by register or login.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = habit_api::app(AppState::new(store, keys));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod body;
pub mod error;
pub mod habits;
pub mod token;
pub mod weekly;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::Request,
  http::{Method, StatusCode, header},
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::{get, post, put},
};
use habit_core::store::HabitStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;
use token::TokenKeys;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: HabitStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenKeys>,
}

impl<S: HabitStore> AppState<S> {
  pub fn new(store: S, tokens: TokenKeys) -> Self {
    Self { store: Arc::new(store), tokens: Arc::new(tokens) }
  }
}

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub message: String,
}

impl Message {
  pub fn new(message: &str) -> Self { Self { message: message.to_owned() } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> Json<Value> { Json(json!({ "status": "Backend is running" })) }

/// Build the API routes, without the `/api` prefix or any middleware.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: HabitStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Auth
    .route("/auth", post(auth::action_handler::<S>))
    .route("/auth/register", post(auth::register_handler::<S>))
    .route("/auth/login", post(auth::login_handler::<S>))
    // Habits
    .route(
      "/habits",
      get(habits::list::<S>)
        .post(habits::create::<S>)
        .put(habits::update_by_body::<S>)
        .delete(habits::delete_by_body::<S>),
    )
    .route("/habits/{id}", put(habits::update::<S>).delete(habits::delete::<S>))
    .route("/habits/{id}/check", post(habits::set_check::<S>))
    .route("/habits/{id}/checks", get(habits::list_checks::<S>))
    // Weekly habits
    .route(
      "/weekly-habits",
      get(weekly::list::<S>)
        .post(weekly::create::<S>)
        .put(weekly::update_by_body::<S>)
        .delete(weekly::delete_by_body::<S>),
    )
    .route("/weekly-habits/{id}", put(weekly::update::<S>).delete(weekly::delete::<S>))
    .with_state(state)
}

/// The complete application: routes under `/api`, CORS, request tracing, and
/// a blanket `200` for every `OPTIONS` request.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: HabitStore + Clone + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

  Router::new()
    .nest("/api", api_router(state))
    .layer(middleware::from_fn(answer_options))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

/// `OPTIONS` never reaches a handler, whatever the path.
async fn answer_options(req: Request, next: Next) -> Response {
  if req.method() == Method::OPTIONS {
    return StatusCode::OK.into_response();
  }
  next.run(req).await
}

#[cfg(test)]
mod tests;
