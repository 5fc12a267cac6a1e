//! Core types and trait definitions for the habit tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::HabitStore`]; the API layer depends on
//! that abstraction only.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod habit;
pub mod store;
pub mod user;
pub mod weekly;

pub use error::{Error, Result};
