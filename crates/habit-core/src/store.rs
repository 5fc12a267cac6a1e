//! The `HabitStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (`habit-store-sqlite`,
//! `habit-store-postgres`). The API layer depends on this abstraction, not on
//! any concrete backend.
//!
//! Habit and weekly-habit methods take the owner's id and must filter on it.
//! Check methods are keyed by habit id alone; callers verify ownership with
//! [`HabitStore::get_habit`] first.

use std::future::Future;

use crate::{
  habit::{Habit, HabitCheck, NewHabit},
  user::{NewUser, User, UserId},
  weekly::{NewWeeklyHabit, WeeklyHabit, WeeklyHabitPatch},
};

// ─── Insert outcome ──────────────────────────────────────────────────────────

/// Result of an insert against a table with uniqueness constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insert<T> {
  Created(T),
  /// A `UNIQUE` or primary-key constraint rejected the row.
  Duplicate,
}

impl<T> Insert<T> {
  pub fn created(self) -> Option<T> {
    match self {
      Self::Created(t) => Some(t),
      Self::Duplicate => None,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a habit store backend.
///
/// Update and delete methods return whether a row matched. A `false` is not
/// an error: callers treat a missing or foreign row as a no-op.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Returns [`Insert::Duplicate`] if the username
  /// or email is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Insert<User>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Habits ────────────────────────────────────────────────────────────

  fn list_habits(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Fetch a habit only if it belongs to `user_id`.
  fn get_habit<'a>(
    &'a self,
    user_id: UserId,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + 'a;

  /// Returns [`Insert::Duplicate`] if the id already exists for any user.
  fn create_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Insert<Habit>, Self::Error>> + Send + '_;

  fn rename_habit<'a>(
    &'a self,
    user_id: UserId,
    id: &'a str,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete a habit together with its check records.
  fn delete_habit<'a>(
    &'a self,
    user_id: UserId,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Checks ────────────────────────────────────────────────────────────

  /// Insert or overwrite the check for `(habit_id, date)` atomically.
  fn upsert_check<'a>(
    &'a self,
    habit_id: &'a str,
    date: &'a str,
    checked: bool,
  ) -> impl Future<Output = Result<HabitCheck, Self::Error>> + Send + 'a;

  fn list_checks<'a>(
    &'a self,
    habit_id: &'a str,
  ) -> impl Future<Output = Result<Vec<HabitCheck>, Self::Error>> + Send + 'a;

  // ── Weekly habits ─────────────────────────────────────────────────────

  fn list_weekly_habits(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<WeeklyHabit>, Self::Error>> + Send + '_;

  fn create_weekly_habit(
    &self,
    input: NewWeeklyHabit,
  ) -> impl Future<Output = Result<Insert<WeeklyHabit>, Self::Error>> + Send + '_;

  /// Apply only the fields present in `patch`.
  fn update_weekly_habit<'a>(
    &'a self,
    user_id: UserId,
    id: &'a str,
    patch: WeeklyHabitPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete_weekly_habit<'a>(
    &'a self,
    user_id: UserId,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
