//! Error type for `flix-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Connection-level failure, including schema setup in `open`.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A statement failed inside an operation.
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// `create` was given an id that is already stored.
  #[error("movie {0} already exists")]
  Conflict(i64),

  #[error("movie not found: {0}")]
  NotFound(i64),

  /// The caller's cancellation token fired before the operation finished.
  #[error("operation cancelled")]
  Cancelled,

  /// An upsert returned no id for a name it was given.
  #[error("{table} name {name:?} did not resolve to an id")]
  Unresolved { table: &'static str, name: String },

  /// The operation failed and the rollback that followed failed too.
  #[error("{source} (rollback failed: {rollback})")]
  Rollback {
    #[source]
    source:   Box<Error>,
    rollback: rusqlite::Error,
  },
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

  pub fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }

  pub fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }

  /// Whether SQLite aborted a statement through the progress handler.
  pub(crate) fn is_interrupted(&self) -> bool {
    match self {
      Self::Sqlite(e) => e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted),
      Self::Rollback { source, .. } => source.is_interrupted(),
      Self::Cancelled => true,
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
