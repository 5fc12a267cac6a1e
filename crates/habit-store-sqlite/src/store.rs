//! [`SqliteStore`] — the SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use habit_core::{
  habit::{Habit, HabitCheck, NewHabit},
  store::{HabitStore, Insert},
  user::{NewUser, User, UserId},
  weekly::{NewWeeklyHabit, WeeklyHabit, WeeklyHabitPatch},
};

use crate::{
  Result,
  encode::{RawHabit, RawUser, RawWeeklyHabit, encode_dt, is_unique_violation},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A habit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run an `INSERT` and report a uniqueness violation as `None` instead of
  /// an error. On success yields the new rowid.
  async fn insert_unique(
    &self,
    sql: &'static str,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Option<i64>> {
    let rowid = self
      .conn
      .call(move |conn| {
        match conn.execute(sql, rusqlite::params_from_iter(params)) {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;
    Ok(rowid)
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Insert<User>> {
    let created_at = Utc::now();

    let rowid = self
      .insert_unique(
        "INSERT INTO users (username, email, password, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          input.username.clone().into(),
          input.email.clone().into(),
          input.password_hash.clone().into(),
          encode_dt(created_at).into(),
        ],
      )
      .await?;

    Ok(match rowid {
      Some(id) => Insert::Created(User {
        id,
        username: input.username,
        email: input.email,
        password_hash: input.password_hash,
        created_at,
      }),
      None => Insert::Duplicate,
    })
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, username, email, password, created_at
             FROM users WHERE email = ?1",
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>> {
    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, name, created_at FROM habits
           WHERE user_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn get_habit(&self, user_id: UserId, id: &str) -> Result<Option<Habit>> {
    let id = id.to_owned();

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, user_id, name, created_at FROM habits
             WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
            RawHabit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn create_habit(&self, input: NewHabit) -> Result<Insert<Habit>> {
    let created_at = Utc::now();

    let rowid = self
      .insert_unique(
        "INSERT INTO habits (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        vec![
          input.id.clone().into(),
          input.user_id.into(),
          input.name.clone().into(),
          encode_dt(created_at).into(),
        ],
      )
      .await?;

    Ok(match rowid {
      Some(_) => Insert::Created(Habit {
        id: input.id,
        user_id: input.user_id,
        name: input.name,
        created_at,
      }),
      None => Insert::Duplicate,
    })
  }

  async fn rename_habit(&self, user_id: UserId, id: &str, name: &str) -> Result<bool> {
    let id = id.to_owned();
    let name = name.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE habits SET name = ?1 WHERE id = ?2 AND user_id = ?3",
          rusqlite::params![name, id, user_id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_habit(&self, user_id: UserId, id: &str) -> Result<bool> {
    let id = id.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Checks reference habits(id); clear them first, but only for a
        // habit the caller owns.
        tx.execute(
          "DELETE FROM habit_checks WHERE habit_id = ?1
             AND EXISTS (SELECT 1 FROM habits WHERE id = ?1 AND user_id = ?2)",
          rusqlite::params![id, user_id],
        )?;
        let n = tx.execute(
          "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Checks ────────────────────────────────────────────────────────────────

  async fn upsert_check(&self, habit_id: &str, date: &str, checked: bool) -> Result<HabitCheck> {
    let habit_id = habit_id.to_owned();
    let date = date.to_owned();

    let check = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO habit_checks (habit_id, date, checked) VALUES (?1, ?2, ?3)
           ON CONFLICT (habit_id, date) DO UPDATE SET checked = excluded.checked
           RETURNING id, habit_id, date, checked",
          rusqlite::params![habit_id, date, checked],
          |row| {
            Ok(HabitCheck {
              id:       row.get(0)?,
              habit_id: row.get(1)?,
              date:     row.get(2)?,
              checked:  row.get(3)?,
            })
          },
        )?)
      })
      .await?;

    Ok(check)
  }

  async fn list_checks(&self, habit_id: &str) -> Result<Vec<HabitCheck>> {
    let habit_id = habit_id.to_owned();

    let checks = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, habit_id, date, checked FROM habit_checks
           WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![habit_id], |row| {
            Ok(HabitCheck {
              id:       row.get(0)?,
              habit_id: row.get(1)?,
              date:     row.get(2)?,
              checked:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(checks)
  }

  // ── Weekly habits ─────────────────────────────────────────────────────────

  async fn list_weekly_habits(&self, user_id: UserId) -> Result<Vec<WeeklyHabit>> {
    let raws: Vec<RawWeeklyHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, week, name, completed, created_at FROM weekly_habits
           WHERE user_id = ?1 ORDER BY week, created_at, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawWeeklyHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWeeklyHabit::into_weekly_habit).collect()
  }

  async fn create_weekly_habit(&self, input: NewWeeklyHabit) -> Result<Insert<WeeklyHabit>> {
    let created_at = Utc::now();

    let rowid = self
      .insert_unique(
        "INSERT INTO weekly_habits (id, user_id, week, name, completed, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        vec![
          input.id.clone().into(),
          input.user_id.into(),
          input.week.into(),
          input.name.clone().into(),
          encode_dt(created_at).into(),
        ],
      )
      .await?;

    Ok(match rowid {
      Some(_) => Insert::Created(WeeklyHabit {
        id: input.id,
        user_id: input.user_id,
        week: input.week,
        name: input.name,
        completed: false,
        created_at,
      }),
      None => Insert::Duplicate,
    })
  }

  async fn update_weekly_habit(
    &self,
    user_id: UserId,
    id:      &str,
    patch:   WeeklyHabitPatch,
  ) -> Result<bool> {
    let id = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE weekly_habits
           SET name      = COALESCE(?1, name),
               completed = COALESCE(?2, completed)
           WHERE id = ?3 AND user_id = ?4",
          rusqlite::params![patch.name, patch.completed, id, user_id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_weekly_habit(&self, user_id: UserId, id: &str) -> Result<bool> {
    let id = id.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM weekly_habits WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
