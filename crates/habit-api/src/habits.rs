//! Handlers for `/habits` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/habits` | Caller's habits |
//! | `POST`   | `/habits` | Body: `{"id","name"}` |
//! | `PUT`    | `/habits/:id` | Body: `{"name"}` |
//! | `DELETE` | `/habits/:id` | |
//! | `PUT`    | `/habits` | Body: `{"id","name"}` |
//! | `DELETE` | `/habits` | Body: `{"id"}` |
//! | `POST`   | `/habits/:id/check` | Body: `{"date","checked"}` |
//! | `GET`    | `/habits/:id/checks` | |
//!
//! Updates and deletes that match no owned row still report success.

use axum::{
  Json,
  extract::{Path, State},
};
use habit_core::{
  habit::{Habit, HabitCheck, NewHabit},
  store::{HabitStore, Insert},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Message, auth::AuthUser, body::JsonBody, error::ApiError};

// ─── Bodies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub id:   Option<String>,
  pub name: Option<String>,
}

/// Body for both `PUT /habits/:id` (id ignored) and `PUT /habits`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub id:   Option<String>,
  pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdBody {
  pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckBody {
  pub date:    Option<String>,
  #[serde(default)]
  pub checked: bool,
}

/// Echo of a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renamed {
  pub id:   String,
  pub name: String,
}

/// Echo of a check write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckAck {
  pub habit_id: String,
  pub date:     String,
  pub checked:  bool,
}

fn body_id(id: Option<String>) -> Result<String, ApiError> {
  id.filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::validation("ID required"))
}

// ─── Operations ───────────────────────────────────────────────────────────────

async fn rename<S: HabitStore>(
  store: &S,
  user:  &AuthUser,
  id:    String,
  name:  Option<String>,
) -> Result<Renamed, ApiError> {
  let name = name
    .filter(|n| !n.is_empty())
    .ok_or_else(|| ApiError::validation("Name required"))?;

  let matched = store
    .rename_habit(user.id, &id, &name)
    .await
    .map_err(ApiError::store("Failed to update habit"))?;
  if !matched {
    tracing::debug!(user_id = user.id, habit_id = %id, "rename matched no owned habit");
  }

  Ok(Renamed { id, name })
}

async fn remove<S: HabitStore>(store: &S, user: &AuthUser, id: &str) -> Result<Message, ApiError> {
  let matched = store
    .delete_habit(user.id, id)
    .await
    .map_err(ApiError::store("Failed to delete habit"))?;
  if !matched {
    tracing::debug!(user_id = user.id, habit_id = %id, "delete matched no owned habit");
  }

  Ok(Message::new("Habit deleted"))
}

/// Whether `habit_id` belongs to the caller. Check reads and writes are
/// limited to owned habits.
async fn owns<S: HabitStore>(
  store:    &S,
  user:     &AuthUser,
  habit_id: &str,
  message:  &'static str,
) -> Result<bool, ApiError> {
  let habit = store
    .get_habit(user.id, habit_id)
    .await
    .map_err(ApiError::store(message))?;
  Ok(habit.is_some())
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /habits`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
) -> Result<Json<Vec<Habit>>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let habits = state
    .store
    .list_habits(user.id)
    .await
    .map_err(ApiError::store("Failed to fetch habits"))?;
  Ok(Json(habits))
}

/// `POST /habits` — body: `{"id":"h1","name":"Read"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<Json<Habit>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let input = NewHabit::new(user.id, body.id.as_deref(), body.name.as_deref())
    .map_err(|_| ApiError::validation("ID and name required"))?;

  match state
    .store
    .create_habit(input)
    .await
    .map_err(ApiError::rejected("Failed to create habit"))?
  {
    Insert::Created(habit) => Ok(Json(habit)),
    Insert::Duplicate => Err(ApiError::conflict("Failed to create habit")),
  }
}

/// `PUT /habits/:id` — body: `{"name":"..."}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Renamed>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  rename(state.store.as_ref(), &user, id, body.name).await.map(Json)
}

/// `PUT /habits` — body: `{"id":"h1","name":"..."}`
pub async fn update_by_body<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Renamed>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  if body.name.as_deref().is_none_or(str::is_empty) {
    return Err(ApiError::validation("Name required"));
  }
  let id = body_id(body.id)?;
  rename(state.store.as_ref(), &user, id, body.name).await.map(Json)
}

/// `DELETE /habits/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<Message>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  remove(state.store.as_ref(), &user, &id).await.map(Json)
}

/// `DELETE /habits` — body: `{"id":"h1"}`
pub async fn delete_by_body<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  JsonBody(body): JsonBody<IdBody>,
) -> Result<Json<Message>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let id = body_id(body.id)?;
  remove(state.store.as_ref(), &user, &id).await.map(Json)
}

/// `POST /habits/:id/check` — body: `{"date":"2026-01-05","checked":true}`
///
/// A check against a habit the caller does not own is acknowledged but not
/// written.
pub async fn set_check<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  Path(habit_id): Path<String>,
  JsonBody(body): JsonBody<CheckBody>,
) -> Result<Json<CheckAck>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let date = body
    .date
    .filter(|d| !d.is_empty())
    .ok_or_else(|| ApiError::validation("Date required"))?;

  const FAILED: &str = "Failed to update check";
  if owns(state.store.as_ref(), &user, &habit_id, FAILED).await? {
    state
      .store
      .upsert_check(&habit_id, &date, body.checked)
      .await
      .map_err(ApiError::store(FAILED))?;
  } else {
    tracing::debug!(user_id = user.id, %habit_id, "check on habit not owned by caller ignored");
  }

  Ok(Json(CheckAck { habit_id, date, checked: body.checked }))
}

/// `GET /habits/:id/checks` — empty for habits the caller does not own.
pub async fn list_checks<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  Path(habit_id): Path<String>,
) -> Result<Json<Vec<HabitCheck>>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  const FAILED: &str = "Failed to fetch checks";
  if !owns(state.store.as_ref(), &user, &habit_id, FAILED).await? {
    return Ok(Json(Vec::new()));
  }

  let checks = state
    .store
    .list_checks(&habit_id)
    .await
    .map_err(ApiError::store(FAILED))?;
  Ok(Json(checks))
}
