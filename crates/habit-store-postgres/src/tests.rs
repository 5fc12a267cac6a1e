//! Tests against a live Postgres instance.
//!
//! Ignored by default. Run with
//! `HABITS_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
//! against a scratch database.

use habit_core::{
  habit::NewHabit,
  store::{HabitStore, Insert},
  user::{NewUser, User},
  weekly::{NewWeeklyHabit, WeeklyHabitPatch},
};

use crate::PgStore;

async fn store() -> PgStore {
  let url = std::env::var("HABITS_TEST_DATABASE_URL")
    .expect("HABITS_TEST_DATABASE_URL must point at a scratch database");
  PgStore::connect(&url).await.expect("connect")
}

/// Unique suffix so repeated runs against the same database do not collide.
fn unique(prefix: &str) -> String {
  format!(
    "{prefix}-{}",
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
  )
}

async fn user(s: &PgStore) -> User {
  let name = unique("user");
  s.create_user(NewUser {
    username:      name.clone(),
    email:         format!("{name}@example.com"),
    password_hash: "$argon2id$placeholder".into(),
  })
  .await
  .unwrap()
  .created()
  .expect("fresh user")
}

#[tokio::test]
#[ignore = "needs HABITS_TEST_DATABASE_URL"]
async fn duplicate_email_is_reported() {
  let s = store().await;
  let alice = user(&s).await;

  let again = s
    .create_user(NewUser {
      username:      unique("other"),
      email:         alice.email.clone(),
      password_hash: "x".into(),
    })
    .await
    .unwrap();
  assert!(matches!(again, Insert::Duplicate));
}

#[tokio::test]
#[ignore = "needs HABITS_TEST_DATABASE_URL"]
async fn habit_crud_and_check_upsert() {
  let s = store().await;
  let alice = user(&s).await;
  let id = unique("h");

  let created = s
    .create_habit(NewHabit { id: id.clone(), user_id: alice.id, name: "Read".into() })
    .await
    .unwrap();
  assert!(matches!(created, Insert::Created(_)));

  s.upsert_check(&id, "2026-01-05", true).await.unwrap();
  s.upsert_check(&id, "2026-01-05", false).await.unwrap();
  let checks = s.list_checks(&id).await.unwrap();
  assert_eq!(checks.len(), 1);
  assert!(!checks[0].checked);

  assert!(s.rename_habit(alice.id, &id, "Read more").await.unwrap());
  assert!(s.delete_habit(alice.id, &id).await.unwrap());
  assert!(s.list_checks(&id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs HABITS_TEST_DATABASE_URL"]
async fn weekly_partial_update_keeps_name() {
  let s = store().await;
  let alice = user(&s).await;
  let id = unique("w");

  s.create_weekly_habit(NewWeeklyHabit {
    id:      id.clone(),
    user_id: alice.id,
    week:    3,
    name:    "Meal prep".into(),
  })
  .await
  .unwrap();

  let patch = WeeklyHabitPatch { name: None, completed: Some(true) };
  assert!(s.update_weekly_habit(alice.id, &id, patch).await.unwrap());

  let listed = s.list_weekly_habits(alice.id).await.unwrap();
  let w = listed.iter().find(|w| w.id == id).unwrap();
  assert_eq!(w.name, "Meal prep");
  assert!(w.completed);
}
