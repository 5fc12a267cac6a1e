//! Weekly habits: one-off tasks attached to a week number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  error::{Result, required},
  user::UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHabit {
  pub id:         String,
  pub user_id:    UserId,
  pub week:       i64,
  pub name:       String,
  pub completed:  bool,
  pub created_at: DateTime<Utc>,
}

/// Input to
/// [`HabitStore::create_weekly_habit`](crate::store::HabitStore::create_weekly_habit).
/// New weekly habits always start incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWeeklyHabit {
  pub id:      String,
  pub user_id: UserId,
  pub week:    i64,
  pub name:    String,
}

impl NewWeeklyHabit {
  /// `week` only has to be present; zero is a valid week number.
  pub fn new(
    user_id: UserId,
    id: Option<&str>,
    week: Option<i64>,
    name: Option<&str>,
  ) -> Result<Self> {
    Ok(Self {
      id: required("id", id)?,
      user_id,
      week: week.ok_or(Error::MissingField("week"))?,
      name: required("name", name)?,
    })
  }
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyHabitPatch {
  pub name:      Option<String>,
  pub completed: Option<bool>,
}

impl WeeklyHabitPatch {
  /// An empty name is treated the same as an absent one.
  pub fn new(name: Option<&str>, completed: Option<bool>) -> Self {
    Self {
      name: name.filter(|n| !n.is_empty()).map(str::to_owned),
      completed,
    }
  }

  pub fn is_empty(&self) -> bool { self.name.is_none() && self.completed.is_none() }
}
