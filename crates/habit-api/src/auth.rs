//! Registration, login, and the bearer-token extractor.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"username","email","password"}` |
//! | `POST` | `/auth/login` | Body: `{"email","password"}` |
//! | `POST` | `/auth` | Same bodies plus `"action": "register" \| "login"` |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{header, request::Parts},
};
use habit_core::{
  store::{HabitStore, Insert},
  user::{NewUser, PublicUser, UserId},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, body::JsonBody, error::ApiError, token::TokenKeys};

// ─── Passwords ────────────────────────────────────────────────────────────────

/// Produce an argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    .unwrap_or(false)
}

// ─── Bodies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
  pub username: Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /auth` body: the union of the register and login fields.
#[derive(Debug, Default, Deserialize)]
pub struct ActionBody {
  pub action:   Option<String>,
  pub username: Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// Successful register/login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  PublicUser,
}

fn present(v: &Option<String>) -> Option<&str> { v.as_deref().filter(|s| !s.is_empty()) }

// ─── Operations ───────────────────────────────────────────────────────────────

pub async fn register<S: HabitStore>(
  store: &S,
  keys:  &TokenKeys,
  body:  RegisterBody,
) -> Result<Session, ApiError> {
  let (Some(username), Some(email), Some(password)) =
    (present(&body.username), present(&body.email), present(&body.password))
  else {
    return Err(ApiError::validation("Missing required fields"));
  };

  let input = NewUser {
    username:      username.to_owned(),
    email:         email.to_owned(),
    password_hash: hash_password(password)?,
  };

  let user = match store
    .create_user(input)
    .await
    .map_err(ApiError::store("Server error"))?
  {
    Insert::Created(user) => user,
    Insert::Duplicate => {
      return Err(ApiError::conflict("Username or email already exists"));
    }
  };

  let user = PublicUser::from(&user);
  tracing::info!(user_id = user.id, username = %user.username, "registered user");
  issue_session(keys, user)
}

/// Both an unknown email and a wrong password yield
/// [`ApiError::InvalidCredentials`], so callers cannot probe for accounts.
pub async fn login<S: HabitStore>(
  store: &S,
  keys:  &TokenKeys,
  body:  LoginBody,
) -> Result<Session, ApiError> {
  let (Some(email), Some(password)) = (present(&body.email), present(&body.password)) else {
    return Err(ApiError::validation("Email and password required"));
  };

  let found = store.find_user_by_email(email).await.map_err(|e| {
    tracing::error!(error = %e, "user lookup failed");
    ApiError::InvalidCredentials
  })?;

  let user = match found {
    Some(u) if verify_password(password, &u.password_hash) => u,
    _ => return Err(ApiError::InvalidCredentials),
  };

  let user = PublicUser::from(&user);
  tracing::info!(user_id = user.id, "login");
  issue_session(keys, user)
}

fn issue_session(keys: &TokenKeys, user: PublicUser) -> Result<Session, ApiError> {
  let token = keys
    .issue(&user)
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
  Ok(Session { token, user })
}

/// Validate an `Authorization` header value. The token is its second
/// whitespace-separated part (`Bearer <token>`).
pub fn authenticate(keys: &TokenKeys, header: Option<&str>) -> Result<AuthUser, ApiError> {
  let token = header
    .and_then(|h| h.split_whitespace().nth(1))
    .ok_or(ApiError::MissingToken)?;

  let claims = keys.verify(token).map_err(|e| {
    tracing::debug!(error = %e, "rejected bearer token");
    ApiError::InvalidToken
  })?;

  Ok(AuthUser {
    id:       claims.id,
    username: claims.username,
    email:    claims.email,
  })
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// The caller, as proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
  pub id:       UserId,
  pub username: String,
  pub email:    String,
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: HabitStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    // Non-ASCII bytes still count as a (bad) token, not a missing one.
    let header = parts
      .headers
      .get(header::AUTHORIZATION)
      .map(|v| String::from_utf8_lossy(v.as_bytes()));
    authenticate(&state.tokens, header.as_deref())
  }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /auth/register`
pub async fn register_handler<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<Json<Session>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  register(state.store.as_ref(), &state.tokens, body).await.map(Json)
}

/// `POST /auth/login`
pub async fn login_handler<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Session>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  login(state.store.as_ref(), &state.tokens, body).await.map(Json)
}

/// `POST /auth` — dispatch on `"action"`.
pub async fn action_handler<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ActionBody>,
) -> Result<Json<Session>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let ActionBody { action, username, email, password } = body;
  let session = match action.as_deref() {
    Some("register") => {
      let body = RegisterBody { username, email, password };
      register(state.store.as_ref(), &state.tokens, body).await?
    }
    Some("login") => {
      let body = LoginBody { email, password };
      login(state.store.as_ref(), &state.tokens, body).await?
    }
    _ => return Err(ApiError::validation("Invalid action")),
  };
  Ok(Json(session))
}
