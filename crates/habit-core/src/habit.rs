//! Daily habits and their per-day check records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  error::{Result, required},
  user::UserId,
};

/// A daily habit. The id is chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub id:         String,
  pub user_id:    UserId,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`HabitStore::create_habit`](crate::store::HabitStore::create_habit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
  pub id:      String,
  pub user_id: UserId,
  pub name:    String,
}

impl NewHabit {
  /// Validate raw request fields; both `id` and `name` must be non-empty.
  pub fn new(user_id: UserId, id: Option<&str>, name: Option<&str>) -> Result<Self> {
    Ok(Self {
      id: required("id", id)?,
      user_id,
      name: required("name", name)?,
    })
  }
}

/// Whether a habit was done on a given day. At most one record exists per
/// `(habit_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCheck {
  pub id:       i64,
  pub habit_id: String,
  /// Calendar date as sent by the client, e.g. `2026-01-05`.
  pub date:     String,
  pub checked:  bool,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn new_habit_requires_id_and_name() {
    assert_eq!(
      NewHabit::new(1, None, Some("Read")),
      Err(Error::MissingField("id"))
    );
    assert_eq!(
      NewHabit::new(1, Some("h1"), Some("")),
      Err(Error::MissingField("name"))
    );

    let h = NewHabit::new(7, Some("h1"), Some("Read")).unwrap();
    assert_eq!(h.user_id, 7);
    assert_eq!(h.id, "h1");
  }

  #[test]
  fn check_serialises_checked_as_bool() {
    let check = HabitCheck {
      id:       3,
      habit_id: "h1".into(),
      date:     "2026-01-05".into(),
      checked:  true,
    };
    let json = serde_json::to_value(&check).unwrap();
    assert_eq!(json["checked"], serde_json::Value::Bool(true));
    assert_eq!(json["habit_id"], "h1");
  }
}
