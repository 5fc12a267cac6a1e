//! Error type for `habit-store-postgres`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// True if `e` is a `UNIQUE` or primary-key violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
  matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
