//! Error types for `habit-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject absent or empty string input.
pub fn required(field: &'static str, value: Option<&str>) -> Result<String> {
  match value {
    Some(v) if !v.is_empty() => Ok(v.to_owned()),
    _ => Err(Error::MissingField(field)),
  }
}
