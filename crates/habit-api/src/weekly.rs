//! Handlers for `/weekly-habits` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/weekly-habits` | Caller's weekly habits |
//! | `POST`   | `/weekly-habits` | Body: `{"id","week","name"}` |
//! | `PUT`    | `/weekly-habits/:id` | Body: `{"name"?, "completed"?}` — partial |
//! | `DELETE` | `/weekly-habits/:id` | |
//! | `PUT`    | `/weekly-habits` | As above with `"id"` in the body |
//! | `DELETE` | `/weekly-habits` | Body: `{"id"}` |

use axum::{
  Json,
  extract::{Path, State},
};
use habit_core::{
  store::{HabitStore, Insert},
  weekly::{NewWeeklyHabit, WeeklyHabit, WeeklyHabitPatch},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Message, auth::AuthUser, body::JsonBody, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub id:   Option<String>,
  pub week: Option<i64>,
  pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub id:        Option<String>,
  pub name:      Option<String>,
  pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdBody {
  pub id: Option<String>,
}

/// Echo of an update; fields the caller left out stay out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Updated {
  pub id:        String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub completed: Option<bool>,
}

fn body_id(id: Option<String>) -> Result<String, ApiError> {
  id.filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::validation("ID required"))
}

async fn apply<S: HabitStore>(
  store: &S,
  user:  &AuthUser,
  id:    String,
  body:  UpdateBody,
) -> Result<Updated, ApiError> {
  let patch = WeeklyHabitPatch::new(body.name.as_deref(), body.completed);

  if patch.is_empty() {
    tracing::debug!(user_id = user.id, weekly_id = %id, "empty weekly habit update");
  } else {
    let matched = store
      .update_weekly_habit(user.id, &id, patch)
      .await
      .map_err(ApiError::store("Failed to update weekly habit"))?;
    if !matched {
      tracing::debug!(user_id = user.id, weekly_id = %id, "update matched no owned weekly habit");
    }
  }

  Ok(Updated { id, name: body.name, completed: body.completed })
}

async fn remove<S: HabitStore>(store: &S, user: &AuthUser, id: &str) -> Result<Message, ApiError> {
  let matched = store
    .delete_weekly_habit(user.id, id)
    .await
    .map_err(ApiError::store("Failed to delete weekly habit"))?;
  if !matched {
    tracing::debug!(user_id = user.id, weekly_id = %id, "delete matched no owned weekly habit");
  }

  Ok(Message::new("Weekly habit deleted"))
}

/// `GET /weekly-habits`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
) -> Result<Json<Vec<WeeklyHabit>>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let habits = state
    .store
    .list_weekly_habits(user.id)
    .await
    .map_err(ApiError::store("Failed to fetch weekly habits"))?;
  Ok(Json(habits))
}

/// `POST /weekly-habits` — body: `{"id":"w1","week":2,"name":"Meal prep"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<Json<WeeklyHabit>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let input = NewWeeklyHabit::new(user.id, body.id.as_deref(), body.week, body.name.as_deref())
    .map_err(|_| ApiError::validation("ID, week, and name required"))?;

  match state
    .store
    .create_weekly_habit(input)
    .await
    .map_err(ApiError::rejected("Failed to create weekly habit"))?
  {
    Insert::Created(habit) => Ok(Json(habit)),
    Insert::Duplicate => Err(ApiError::conflict("Failed to create weekly habit")),
  }
}

/// `PUT /weekly-habits/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Updated>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  apply(state.store.as_ref(), &user, id, body).await.map(Json)
}

/// `PUT /weekly-habits` — id taken from the body.
pub async fn update_by_body<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  JsonBody(mut body): JsonBody<UpdateBody>,
) -> Result<Json<Updated>, ApiError>
where
  S: HabitStore + Clone + 'static,
{
  let id = body_id(body.id.take())?;
  apply(state.store.as_ref(), &user, id, body).await.map(Json)
}

/// `DELETE /weekly-habits/:id`
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

/// `DELETE /weekly-habits` — body: `{"id":"w1"}`
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
