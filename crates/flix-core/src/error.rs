//! Error types for `flix-core`.

use thiserror::Error;

/// Failures turning an external catalog record into a [`Movie`].
///
/// [`Movie`]: crate::Movie
#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("record has no column {0}")]
  MissingColumn(usize),

  #[error("invalid movie id: {0:?}")]
  InvalidId(String),

  #[error("invalid date (expected YYYY-MM-DD): {0:?}")]
  InvalidDate(String),

  #[error("invalid rating: {0:?}")]
  InvalidRating(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
