//! [`PgStore`] — the Postgres implementation of [`HabitStore`].

use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};

use habit_core::{
  habit::{Habit, HabitCheck, NewHabit},
  store::{HabitStore, Insert},
  user::{NewUser, User, UserId},
  weekly::{NewWeeklyHabit, WeeklyHabit, WeeklyHabitPatch},
};

use crate::{Result, error::is_unique_violation, schema::SCHEMA};

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct UserRow {
  id:            i64,
  username:      String,
  email:         String,
  password_hash: String,
  created_at:    DateTime<Utc>,
}

impl From<UserRow> for User {
  fn from(r: UserRow) -> Self {
    Self {
      id:            r.id,
      username:      r.username,
      email:         r.email,
      password_hash: r.password_hash,
      created_at:    r.created_at,
    }
  }
}

#[derive(sqlx::FromRow)]
struct HabitRow {
  id:         String,
  user_id:    i64,
  name:       String,
  created_at: DateTime<Utc>,
}

impl From<HabitRow> for Habit {
  fn from(r: HabitRow) -> Self {
    Self {
      id:         r.id,
      user_id:    r.user_id,
      name:       r.name,
      created_at: r.created_at,
    }
  }
}

#[derive(sqlx::FromRow)]
struct CheckRow {
  id:       i64,
  habit_id: String,
  date:     String,
  checked:  bool,
}

impl From<CheckRow> for HabitCheck {
  fn from(r: CheckRow) -> Self {
    Self {
      id:       r.id,
      habit_id: r.habit_id,
      date:     r.date,
      checked:  r.checked,
    }
  }
}

#[derive(sqlx::FromRow)]
struct WeeklyRow {
  id:         String,
  user_id:    i64,
  week:       i64,
  name:       String,
  completed:  bool,
  created_at: DateTime<Utc>,
}

impl From<WeeklyRow> for WeeklyHabit {
  fn from(r: WeeklyRow) -> Self {
    Self {
      id:         r.id,
      user_id:    r.user_id,
      week:       r.week,
      name:       r.name,
      completed:  r.completed,
      created_at: r.created_at,
    }
  }
}

/// Map a uniqueness violation to [`Insert::Duplicate`]; pass everything else
/// through.
fn insert_outcome<R, T: From<R>>(res: sqlx::Result<R>) -> Result<Insert<T>> {
  match res {
    Ok(row) => Ok(Insert::Created(row.into())),
    Err(e) if is_unique_violation(&e) => Ok(Insert::Duplicate),
    Err(e) => Err(e.into()),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A habit store backed by a Postgres connection pool.
///
/// Cloning is cheap — [`PgPool`] is reference-counted.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Connect to `url` and run schema initialisation.
  pub async fn connect(url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
    Self::from_pool(pool).await
  }

  /// Wrap an existing pool and run schema initialisation.
  pub async fn from_pool(pool: PgPool) -> Result<Self> {
    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    tracing::debug!("postgres schema ready");
    Ok(Self { pool })
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for PgStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Insert<User>> {
    let res = sqlx::query_as::<_, UserRow>(
      "INSERT INTO users (username, email, password) VALUES ($1, $2, $3)
       RETURNING id, username, email, password AS password_hash, created_at",
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&input.password_hash)
    .fetch_one(&self.pool)
    .await;

    insert_outcome(res)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
      "SELECT id, username, email, password AS password_hash, created_at
       FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(User::from))
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>> {
    let rows = sqlx::query_as::<_, HabitRow>(
      "SELECT id, user_id, name, created_at FROM habits
       WHERE user_id = $1 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Habit::from).collect())
  }

  async fn get_habit(&self, user_id: UserId, id: &str) -> Result<Option<Habit>> {
    let row = sqlx::query_as::<_, HabitRow>(
      "SELECT id, user_id, name, created_at FROM habits
       WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Habit::from))
  }

  async fn create_habit(&self, input: NewHabit) -> Result<Insert<Habit>> {
    let res = sqlx::query_as::<_, HabitRow>(
      "INSERT INTO habits (id, user_id, name) VALUES ($1, $2, $3)
       RETURNING id, user_id, name, created_at",
    )
    .bind(&input.id)
    .bind(input.user_id)
    .bind(&input.name)
    .fetch_one(&self.pool)
    .await;

    insert_outcome(res)
  }

  async fn rename_habit(&self, user_id: UserId, id: &str, name: &str) -> Result<bool> {
    let done = sqlx::query("UPDATE habits SET name = $1 WHERE id = $2 AND user_id = $3")
      .bind(name)
      .bind(id)
      .bind(user_id)
      .execute(&self.pool)
      .await?;

    Ok(done.rows_affected() > 0)
  }

  async fn delete_habit(&self, user_id: UserId, id: &str) -> Result<bool> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "DELETE FROM habit_checks WHERE habit_id = $1
         AND EXISTS (SELECT 1 FROM habits WHERE id = $1 AND user_id = $2)",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let done = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
      .bind(id)
      .bind(user_id)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;
    Ok(done.rows_affected() > 0)
  }

  // ── Checks ────────────────────────────────────────────────────────────────

  async fn upsert_check(&self, habit_id: &str, date: &str, checked: bool) -> Result<HabitCheck> {
    let row = sqlx::query_as::<_, CheckRow>(
      "INSERT INTO habit_checks (habit_id, date, checked) VALUES ($1, $2, $3)
       ON CONFLICT (habit_id, date) DO UPDATE SET checked = EXCLUDED.checked
       RETURNING id, habit_id, date, checked",
    )
    .bind(habit_id)
    .bind(date)
    .bind(checked)
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  async fn list_checks(&self, habit_id: &str) -> Result<Vec<HabitCheck>> {
    let rows = sqlx::query_as::<_, CheckRow>(
      "SELECT id, habit_id, date, checked FROM habit_checks
       WHERE habit_id = $1 ORDER BY date",
    )
    .bind(habit_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(HabitCheck::from).collect())
  }

  // ── Weekly habits ─────────────────────────────────────────────────────────

  async fn list_weekly_habits(&self, user_id: UserId) -> Result<Vec<WeeklyHabit>> {
    let rows = sqlx::query_as::<_, WeeklyRow>(
      "SELECT id, user_id, week, name, completed, created_at FROM weekly_habits
       WHERE user_id = $1 ORDER BY week, created_at, id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(WeeklyHabit::from).collect())
  }

  async fn create_weekly_habit(&self, input: NewWeeklyHabit) -> Result<Insert<WeeklyHabit>> {
    let res = sqlx::query_as::<_, WeeklyRow>(
      "INSERT INTO weekly_habits (id, user_id, week, name, completed)
       VALUES ($1, $2, $3, $4, false)
       RETURNING id, user_id, week, name, completed, created_at",
    )
    .bind(&input.id)
    .bind(input.user_id)
    .bind(input.week)
    .bind(&input.name)
    .fetch_one(&self.pool)
    .await;

    insert_outcome(res)
  }

  async fn update_weekly_habit(
    &self,
    user_id: UserId,
    id:      &str,
    patch:   WeeklyHabitPatch,
  ) -> Result<bool> {
    let done = sqlx::query(
      "UPDATE weekly_habits
       SET name      = COALESCE($1, name),
           completed = COALESCE($2, completed)
       WHERE id = $3 AND user_id = $4",
    )
    .bind(patch.name)
    .bind(patch.completed)
    .bind(id)
    .bind(user_id)
    .execute(&self.pool)
    .await?;

    Ok(done.rows_affected() > 0)
  }

  async fn delete_weekly_habit(&self, user_id: UserId, id: &str) -> Result<bool> {
    let done = sqlx::query("DELETE FROM weekly_habits WHERE id = $1 AND user_id = $2")
      .bind(id)
      .bind(user_id)
      .execute(&self.pool)
      .await?;

    Ok(done.rows_affected() > 0)
  }
}
