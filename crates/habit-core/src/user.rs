//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the store.
pub type UserId = i64;

/// A stored account, including the password hash. Never serialised; use
/// [`PublicUser`] for anything that leaves the server.
#[derive(Debug, Clone)]
pub struct User {
  pub id:            UserId,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// The account fields safe to hand back to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
  pub id:       UserId,
  pub username: String,
  pub email:    String,
}

impl From<&User> for PublicUser {
  fn from(u: &User) -> Self {
    Self {
      id:       u.id,
      username: u.username.clone(),
      email:    u.email.clone(),
    }
  }
}

/// Input to [`HabitStore::create_user`](crate::store::HabitStore::create_user).
/// The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
}
