//! Local monthly dashboard: state, updates, and derived progress figures.
//!
//! [`Dashboard::apply`] never mutates its receiver; every [`Action`] yields a
//! new state, which the caller persists through
//! [`StateStorage`](crate::storage::StateStorage).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const DAYS_IN_MONTH: u32 = 31;
pub const WEEKS: u32 = 5;

const HABIT_SLOTS: usize = 10;
const TASK_SLOTS: usize = 5;

// ─── State ────────────────────────────────────────────────────────────────────

/// A daily habit row. `checks` holds the checked days of the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHabit {
  pub id:     String,
  pub name:   String,
  #[serde(default)]
  pub checks: BTreeSet<u32>,
}

impl DailyHabit {
  pub fn is_named(&self) -> bool { !self.name.trim().is_empty() }

  /// Share of the month's days checked, as a percentage.
  pub fn month_rate(&self) -> f64 {
    self.checks.len() as f64 / f64::from(DAYS_IN_MONTH) * 100.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id:        String,
  pub name:      String,
  #[serde(default)]
  pub completed: bool,
}

impl Task {
  fn blank(id: String) -> Self { Self { id, name: String::new(), completed: false } }

  pub fn is_named(&self) -> bool { !self.name.trim().is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
  pub month:      String,
  pub year:       String,
  pub habits:     Vec<DailyHabit>,
  /// Weekly tasks keyed by week number, 1 through [`WEEKS`].
  pub weekly:     BTreeMap<u32, Vec<Task>>,
  /// Monthly goals.
  pub goals:      Vec<Task>,
  #[serde(default)]
  pub reflection: String,
}

impl Default for Dashboard {
  fn default() -> Self {
    let starters = ["Read 10 pages", "Drink 3L water", "Workout 30 mins"];
    let habits = (0..HABIT_SLOTS)
      .map(|i| DailyHabit {
        id:     format!("h-{i}"),
        name:   starters.get(i).copied().unwrap_or_default().to_owned(),
        checks: BTreeSet::new(),
      })
      .collect();

    let weekly = (1..=WEEKS)
      .map(|week| {
        let tasks = (0..TASK_SLOTS).map(|i| Task::blank(format!("wh-{i}"))).collect();
        (week, tasks)
      })
      .collect();

    let goals = [("m1", "Finish project A"), ("m2", "Save $500"), ("m3", "Read 2 books")]
      .into_iter()
      .map(|(id, name)| Task { id: id.into(), name: name.into(), completed: false })
      .collect();

    Self {
      month: "January".into(),
      year: "2026".into(),
      habits,
      weekly,
      goals,
      reflection: String::new(),
    }
  }
}

// ─── Updates ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  SetMonth(String),
  SetYear(String),
  RenameHabit { id: String, name: String },
  /// Flip one day of a daily habit. Days outside 1..=31 are ignored.
  ToggleCheck { id: String, day: u32 },
  RenameTask { week: u32, id: String, name: String },
  ToggleTask { week: u32, id: String },
  RenameGoal { id: String, name: String },
  ToggleGoal { id: String },
  SetReflection(String),
  Reset,
}

impl Dashboard {
  /// The state after `action`. Unknown ids leave the state unchanged.
  pub fn apply(&self, action: Action) -> Dashboard {
    let mut next = self.clone();
    match action {
      Action::SetMonth(month) => next.month = month,
      Action::SetYear(year) => next.year = year,
      Action::RenameHabit { id, name } => {
        if let Some(h) = next.habits.iter_mut().find(|h| h.id == id) {
          h.name = name;
        }
      }
      Action::ToggleCheck { id, day } => {
        if !(1..=DAYS_IN_MONTH).contains(&day) {
          return next;
        }
        if let Some(h) = next.habits.iter_mut().find(|h| h.id == id)
          && !h.checks.remove(&day)
        {
          h.checks.insert(day);
        }
      }
      Action::RenameTask { week, id, name } => {
        if let Some(t) = next.task_mut(week, &id) {
          t.name = name;
        }
      }
      Action::ToggleTask { week, id } => {
        if let Some(t) = next.task_mut(week, &id) {
          t.completed = !t.completed;
        }
      }
      Action::RenameGoal { id, name } => {
        if let Some(g) = next.goals.iter_mut().find(|g| g.id == id) {
          g.name = name;
        }
      }
      Action::ToggleGoal { id } => {
        if let Some(g) = next.goals.iter_mut().find(|g| g.id == id) {
          g.completed = !g.completed;
        }
      }
      Action::SetReflection(text) => next.reflection = text,
      Action::Reset => next = Dashboard::default(),
    }
    next
  }

  fn task_mut(&mut self, week: u32, id: &str) -> Option<&mut Task> {
    self.weekly.get_mut(&week)?.iter_mut().find(|t| t.id == id)
  }
}

// ─── Derived figures ──────────────────────────────────────────────────────────

/// Which week of the month `day` falls in: 1–7 → 1, …, 29–31 → 5.
pub fn week_for_day(day: u32) -> u32 {
  match day {
    ..=7 => 1,
    8..=14 => 2,
    15..=21 => 3,
    22..=28 => 4,
    _ => 5,
  }
}

fn percent(part: usize, whole: usize) -> u32 {
  if whole == 0 {
    return 0;
  }
  (part as f64 / whole as f64 * 100.0).round() as u32
}

impl Dashboard {
  /// Percentage of named habits checked on `day`.
  ///
  /// Checks left on unnamed slots are not counted, so the figure never
  /// exceeds 100.
  pub fn daily_progress(&self, day: u32) -> u32 {
    let named: Vec<_> = self.habits.iter().filter(|h| h.is_named()).collect();
    let checked = named.iter().filter(|h| h.checks.contains(&day)).count();
    percent(checked, named.len())
  }

  /// `(day, progress)` for every day of the month.
  pub fn daily_series(&self) -> Vec<(u32, u32)> {
    (1..=DAYS_IN_MONTH).map(|day| (day, self.daily_progress(day))).collect()
  }

  /// Mean daily progress across the month, to one decimal place.
  pub fn total_completion(&self) -> f64 {
    let sum: u32 = self.daily_series().iter().map(|(_, p)| p).sum();
    let mean = f64::from(sum) / f64::from(DAYS_IN_MONTH);
    (mean * 10.0).round() / 10.0
  }

  /// Percentage of named weekly tasks completed, across all weeks.
  pub fn weekly_progress(&self) -> u32 {
    let named = self.weekly.values().flatten().filter(|t| t.is_named());
    let (done, total) = named.fold((0, 0), |(d, n), t| (d + usize::from(t.completed), n + 1));
    percent(done, total)
  }

  /// Percentage of named tasks completed in `week`.
  pub fn week_progress(&self, week: u32) -> u32 {
    let Some(tasks) = self.weekly.get(&week) else { return 0 };
    let named: Vec<_> = tasks.iter().filter(|t| t.is_named()).collect();
    percent(named.iter().filter(|t| t.completed).count(), named.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toggle(id: &str, day: u32) -> Action { Action::ToggleCheck { id: id.into(), day } }

  #[test]
  fn day_maps_to_week() {
    let weeks: Vec<u32> = [1, 7, 8, 14, 15, 21, 22, 28, 29, 31].map(week_for_day).to_vec();
    assert_eq!(weeks, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
  }

  #[test]
  fn toggling_twice_restores_state() {
    let board = Dashboard::default();
    let once = board.apply(toggle("h-0", 5));
    assert!(once.habits[0].checks.contains(&5));
    assert!(board.habits[0].checks.is_empty(), "apply must leave the receiver unchanged");

    let twice = once.apply(toggle("h-0", 5));
    assert_eq!(twice, board);
  }

  #[test]
  fn out_of_range_days_and_unknown_ids_are_ignored() {
    let board = Dashboard::default();
    assert_eq!(board.apply(toggle("h-0", 0)), board);
    assert_eq!(board.apply(toggle("h-0", 32)), board);
    assert_eq!(board.apply(toggle("nope", 3)), board);
    assert_eq!(
      board.apply(Action::ToggleTask { week: 9, id: "wh-0".into() }),
      board
    );
  }

  #[test]
  fn daily_progress_counts_named_habits_only() {
    // Three named starters out of ten slots.
    let board = Dashboard::default().apply(toggle("h-0", 1)).apply(toggle("h-1", 1));
    assert_eq!(board.daily_progress(1), 67);
    assert_eq!(board.daily_progress(2), 0);

    // A check on an unnamed slot does not count.
    let board = board.apply(toggle("h-9", 2));
    assert_eq!(board.daily_progress(2), 0);
  }

  #[test]
  fn no_named_habits_means_zero_progress() {
    let mut board = Dashboard::default();
    for h in &mut board.habits {
      h.name.clear();
    }
    let board = board.apply(toggle("h-0", 1));
    assert_eq!(board.daily_progress(1), 0);
    assert_eq!(board.total_completion(), 0.0);
  }

  #[test]
  fn total_completion_is_mean_over_the_month() {
    let mut board = Dashboard::default();
    for id in ["h-0", "h-1", "h-2"] {
      board = board.apply(toggle(id, 1));
    }
    // 100 on day 1, 0 on the other 30 days: 100 / 31 = 3.2258…
    assert_eq!(board.total_completion(), 3.2);
  }

  #[test]
  fn weekly_progress_ignores_unnamed_tasks() {
    let board = Dashboard::default()
      .apply(Action::RenameTask { week: 1, id: "wh-0".into(), name: "Laundry".into() })
      .apply(Action::RenameTask { week: 1, id: "wh-1".into(), name: "Groceries".into() })
      .apply(Action::RenameTask { week: 2, id: "wh-0".into(), name: "Meal prep".into() })
      .apply(Action::ToggleTask { week: 1, id: "wh-0".into() })
      .apply(Action::ToggleTask { week: 1, id: "wh-4".into() });

    assert_eq!(board.week_progress(1), 50);
    assert_eq!(board.week_progress(2), 0);
    assert_eq!(board.week_progress(3), 0);
    assert_eq!(board.weekly_progress(), 33);
  }

  #[test]
  fn goals_and_labels_update() {
    let board = Dashboard::default()
      .apply(Action::ToggleGoal { id: "m2".into() })
      .apply(Action::RenameGoal { id: "m3".into(), name: "Read 3 books".into() })
      .apply(Action::SetMonth("February".into()))
      .apply(Action::SetReflection("Good month".into()));

    assert!(board.goals[1].completed);
    assert_eq!(board.goals[2].name, "Read 3 books");
    assert_eq!(board.month, "February");
    assert_eq!(board.reflection, "Good month");
    assert_eq!(board.apply(Action::Reset), Dashboard::default());
  }

  #[test]
  fn month_rate_counts_checked_days() {
    let board = Dashboard::default().apply(toggle("h-0", 1)).apply(toggle("h-0", 2));
    let rate = board.habits[0].month_rate();
    assert!((rate - 200.0 / 31.0).abs() < 1e-9);
  }
}
