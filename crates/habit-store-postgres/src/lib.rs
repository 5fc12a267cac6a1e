//! Postgres backend for the habit store, for deployments that keep their data
//! in a hosted database rather than a local file.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::PgStore;

#[cfg(test)]
mod tests;
