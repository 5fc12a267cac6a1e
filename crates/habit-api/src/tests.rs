//! End-to-end router tests against an in-memory SQLite store.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use habit_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;
use crate::token::DEFAULT_TTL;

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState::new(store, TokenKeys::new(b"test-secret", DEFAULT_TTL))
}

async fn send(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn register(state: &AppState<SqliteStore>, username: &str) -> String {
  let (status, body) = send(
    state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({
      "username": username,
      "email": format!("{username}@example.com"),
      "password": "pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

// ── Front door ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/api/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "Backend is running");
}

#[tokio::test]
async fn options_is_answered_everywhere() {
  let state = make_state().await;
  for uri in ["/api/habits", "/api/weekly-habits/w1", "/api/nowhere"] {
    let req = Request::builder()
      .method("OPTIONS")
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    let resp = app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
  }
}

#[tokio::test]
async fn cors_headers_are_present() {
  let state = make_state().await;
  let req = Request::builder()
    .uri("/api/health")
    .header(header::ORIGIN, "http://localhost:3000")
    .body(Body::empty())
    .unwrap();
  let resp = app(state).oneshot(req).await.unwrap();
  assert_eq!(
    resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
    "*"
  );
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
  let state = make_state().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/auth/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_email_conflicts() {
  let state = make_state().await;
  register(&state, "alice").await;

  let (status, body) = send(
    &state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({ "username": "bob", "email": "alice@example.com", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Username or email already exists");
}

#[tokio::test]
async fn login_failures_share_status_and_text() {
  let state = make_state().await;
  register(&state, "alice").await;

  let wrong = send(
    &state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": "alice@example.com", "password": "nope" })),
  )
  .await;
  let unknown = send(
    &state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": "ghost@example.com", "password": "pw" })),
  )
  .await;

  assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
  assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn action_route_dispatches() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/api/auth",
    None,
    Some(json!({
      "action": "register",
      "username": "alice",
      "email": "alice@example.com",
      "password": "pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["username"], "alice");
  assert!(body["user"].get("password").is_none());

  let (status, body) = send(
    &state,
    "POST",
    "/api/auth",
    None,
    Some(json!({ "action": "login", "email": "alice@example.com", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["token"].is_string());

  let (status, body) =
    send(&state, "POST", "/api/auth", None, Some(json!({ "action": "logout" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Invalid action");
}

#[tokio::test]
async fn bearer_token_gate() {
  let state = make_state().await;
  let token = register(&state, "alice").await;

  let (status, body) = send(&state, "GET", "/api/habits", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Access token required");

  let (status, _) = send(&state, "GET", "/api/habits", Some("garbage"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  // Flip the first character of the signature segment.
  let sig_start = token.rfind('.').unwrap() + 1;
  let mut tampered = token.clone();
  let replacement = if &token[sig_start..=sig_start] == "A" { "B" } else { "A" };
  tampered.replace_range(sig_start..=sig_start, replacement);
  let (status, body) = send(&state, "GET", "/api/habits", Some(&tampered), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "Invalid token");

  let (status, _) = send(&state, "GET", "/api/habits", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_token_is_forbidden() {
  let state = make_state().await;
  let req = Request::builder()
    .uri("/api/habits")
    .header(header::AUTHORIZATION, header::HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap())
    .body(Body::empty())
    .unwrap();
  let resp = app(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_for_unknown_user_cannot_create() {
  let state = make_state().await;
  let ghost = habit_core::user::PublicUser {
    id:       999,
    username: "ghost".into(),
    email:    "ghost@example.com".into(),
  };
  let token = state.tokens.issue(&ghost).unwrap();

  let (status, body) = send(
    &state,
    "POST",
    "/api/habits",
    Some(&token),
    Some(json!({ "id": "hz", "name": "n" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Failed to create habit");

  let (status, body) = send(
    &state,
    "POST",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "wz", "week": 1, "name": "n" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Failed to create weekly habit");
}

#[tokio::test]
async fn expired_token_is_forbidden() {
  let state = make_state().await;
  register(&state, "alice").await;

  let user = habit_core::user::PublicUser {
    id:       1,
    username: "alice".into(),
    email:    "alice@example.com".into(),
  };
  let mut claims = token::Claims::new(&user, DEFAULT_TTL);
  claims.iat -= chrono::Duration::days(30).num_seconds();
  claims.exp = claims.iat + 60;
  let expired = state.tokens.sign(&claims).unwrap();

  let (status, _) = send(&state, "GET", "/api/habits", Some(&expired), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Habits ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_list() {
  let state = make_state().await;
  let token = register(&state, "alice").await;

  let (status, created) = send(
    &state,
    "POST",
    "/api/habits",
    Some(&token),
    Some(json!({ "id": "h1", "name": "Read" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(created["id"], "h1");

  let (_, list) = send(&state, "GET", "/api/habits", Some(&token), None).await;
  let list = list.as_array().unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0]["name"], "Read");

  let (status, body) =
    send(&state, "POST", "/api/habits", Some(&token), Some(json!({ "id": "h2" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "ID and name required");
}

#[tokio::test]
async fn rename_by_path_and_by_body() {
  let state = make_state().await;
  let token = register(&state, "alice").await;
  send(&state, "POST", "/api/habits", Some(&token), Some(json!({ "id": "h1", "name": "Read" })))
    .await;

  let (status, body) = send(
    &state,
    "PUT",
    "/api/habits/h1",
    Some(&token),
    Some(json!({ "name": "Read more" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "id": "h1", "name": "Read more" }));

  let (status, _) = send(
    &state,
    "PUT",
    "/api/habits",
    Some(&token),
    Some(json!({ "id": "h1", "name": "Read daily" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, list) = send(&state, "GET", "/api/habits", Some(&token), None).await;
  assert_eq!(list[0]["name"], "Read daily");

  let (status, body) =
    send(&state, "PUT", "/api/habits", Some(&token), Some(json!({ "name": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "ID required");
}

#[tokio::test]
async fn check_upsert_keeps_one_row() {
  let state = make_state().await;
  let token = register(&state, "alice").await;
  send(&state, "POST", "/api/habits", Some(&token), Some(json!({ "id": "h1", "name": "Read" })))
    .await;

  for checked in [true, false] {
    let (status, body) = send(
      &state,
      "POST",
      "/api/habits/h1/check",
      Some(&token),
      Some(json!({ "date": "2026-01-05", "checked": checked })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checked"], checked);
  }

  let (_, checks) = send(&state, "GET", "/api/habits/h1/checks", Some(&token), None).await;
  let checks = checks.as_array().unwrap();
  assert_eq!(checks.len(), 1);
  assert_eq!(checks[0]["checked"], false);
}

#[tokio::test]
async fn foreign_delete_is_a_silent_success() {
  let state = make_state().await;
  let alice = register(&state, "alice").await;
  let bob = register(&state, "bob").await;
  send(&state, "POST", "/api/habits", Some(&alice), Some(json!({ "id": "h1", "name": "Read" })))
    .await;
  send(
    &state,
    "POST",
    "/api/habits/h1/check",
    Some(&alice),
    Some(json!({ "date": "2026-01-05", "checked": true })),
  )
  .await;

  let (status, body) = send(&state, "DELETE", "/api/habits/h1", Some(&bob), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Habit deleted");

  // Bob sees neither the habit nor its checks, and cannot write checks.
  let (_, checks) = send(&state, "GET", "/api/habits/h1/checks", Some(&bob), None).await;
  assert_eq!(checks, json!([]));
  send(
    &state,
    "POST",
    "/api/habits/h1/check",
    Some(&bob),
    Some(json!({ "date": "2026-01-05", "checked": false })),
  )
  .await;

  let (_, list) = send(&state, "GET", "/api/habits", Some(&alice), None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  let (_, checks) = send(&state, "GET", "/api/habits/h1/checks", Some(&alice), None).await;
  assert_eq!(checks[0]["checked"], true);

  let (status, body) =
    send(&state, "DELETE", "/api/habits", Some(&alice), Some(json!({ "id": "h1" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Habit deleted");
  let (_, list) = send(&state, "GET", "/api/habits", Some(&alice), None).await;
  assert_eq!(list, json!([]));
}

// ── Weekly habits ────────────────────────────────────────────────────────────

#[tokio::test]
async fn weekly_partial_update_keeps_name() {
  let state = make_state().await;
  let token = register(&state, "alice").await;

  let (status, created) = send(
    &state,
    "POST",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "w1", "week": 2, "name": "Meal prep" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(created["completed"], false);

  let (status, body) = send(
    &state,
    "PUT",
    "/api/weekly-habits/w1",
    Some(&token),
    Some(json!({ "completed": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "id": "w1", "completed": true }));

  let (_, list) = send(&state, "GET", "/api/weekly-habits", Some(&token), None).await;
  assert_eq!(list[0]["name"], "Meal prep");
  assert_eq!(list[0]["completed"], true);
  assert_eq!(list[0]["week"], 2);
}

#[tokio::test]
async fn weekly_body_keyed_routes() {
  let state = make_state().await;
  let token = register(&state, "alice").await;
  send(
    &state,
    "POST",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "w1", "week": 1, "name": "Laundry" })),
  )
  .await;

  let (status, _) = send(
    &state,
    "PUT",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "w1", "name": "Laundry and ironing" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) =
    send(&state, "DELETE", "/api/weekly-habits", Some(&token), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "ID required");

  let (status, body) = send(
    &state,
    "DELETE",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "w1" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Weekly habit deleted");

  let (_, list) = send(&state, "GET", "/api/weekly-habits", Some(&token), None).await;
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn weekly_create_requires_fields() {
  let state = make_state().await;
  let token = register(&state, "alice").await;
  let (status, body) = send(
    &state,
    "POST",
    "/api/weekly-habits",
    Some(&token),
    Some(json!({ "id": "w1", "name": "No week" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "ID, week, and name required");
}
