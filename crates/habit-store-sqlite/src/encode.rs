//! Conversions between domain types and the plain-text representations
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; booleans as `0`/`1`.

use chrono::{DateTime, Utc};
use habit_core::{habit::Habit, user::User, weekly::WeeklyHabit};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Constraint violations ───────────────────────────────────────────────────

/// True if `e` is a `UNIQUE` or primary-key violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `users` row with its timestamp still in text form.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawHabit {
  pub id:         String,
  pub user_id:    i64,
  pub name:       String,
  pub created_at: String,
}

impl RawHabit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      id:         self.id,
      user_id:    self.user_id,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawWeeklyHabit {
  pub id:         String,
  pub user_id:    i64,
  pub week:       i64,
  pub name:       String,
  pub completed:  bool,
  pub created_at: String,
}

impl RawWeeklyHabit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      week:       row.get(2)?,
      name:       row.get(3)?,
      completed:  row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_weekly_habit(self) -> Result<WeeklyHabit> {
    Ok(WeeklyHabit {
      id:         self.id,
      user_id:    self.user_id,
      week:       self.week,
      name:       self.name,
      completed:  self.completed,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_roundtrip_keeps_instant() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn garbage_dt_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
