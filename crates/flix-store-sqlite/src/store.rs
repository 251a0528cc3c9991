//! [`SqliteRepository`]: the SQLite implementation of [`MovieRepository`].

use std::path::Path;

use flix_core::{Movie, MovieRepository, Query};
use tokio_util::sync::CancellationToken;

use crate::{
  abort::{with_abort, Abort},
  read,
  schema::SCHEMA,
  write, Error, Result,
};

// ─── Repository ──────────────────────────────────────────────────────────────

/// A movie catalog backed by a single SQLite database.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection, whose calls run one at a time on a dedicated thread.
#[derive(Clone)]
pub struct SqliteRepository {
  conn: tokio_rusqlite::Connection,
}

impl SqliteRepository {
  /// Open (or create) a catalog at `path` and run schema initialisation.
  ///
  /// A schema failure is returned here and no repository is produced.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let repo = Self { conn };
    repo.init_schema().await?;
    Ok(repo)
  }

  /// Open an in-memory catalog, used for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let repo = Self { conn };
    repo.init_schema().await?;
    Ok(repo)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` on the database thread under the caller's cancellation token.
  ///
  /// On cancellation the operation's abort flag is tripped and the call is
  /// still awaited, so any open transaction has been rolled back by the time
  /// this returns. An operation that completed before the abort took effect
  /// returns its result.
  async fn call<T, F>(&self, cancel: &CancellationToken, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection, &Abort) -> Result<T> + Send + 'static,
  {
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }

    let abort = Abort::default();
    let worker = abort.clone();
    let call = self
      .conn
      .call(move |conn| Ok(with_abort(conn, &worker, op)));
    tokio::pin!(call);

    let outcome = tokio::select! {
      biased;
      outcome = &mut call => outcome,
      () = cancel.cancelled() => {
        abort.trip();
        call.await
      }
    };

    outcome?
  }
}

// ─── MovieRepository impl ────────────────────────────────────────────────────

impl MovieRepository for SqliteRepository {
  type Error = Error;

  async fn create(&self, movie: &Movie, cancel: &CancellationToken) -> Result<()> {
    let id = movie.id;
    let movie = movie.clone();

    let result = self
      .call(cancel, move |conn, abort| write::create(conn, &movie, abort))
      .await;

    match &result {
      Ok(()) => tracing::debug!(movie_id = id, "created movie"),
      Err(e) => tracing::debug!(movie_id = id, error = %e, "create failed"),
    }
    result
  }

  async fn read(&self, id: i64, cancel: &CancellationToken) -> Result<Movie> {
    self
      .call(cancel, move |conn, _| read::read(conn, id))
      .await?
      .ok_or(Error::NotFound(id))
  }

  async fn query(
    &self,
    query: &Query,
    cancel: &CancellationToken,
  ) -> Result<Vec<Movie>> {
    let query = query.clone();

    let movies = self
      .call(cancel, move |conn, _| read::query(conn, &query))
      .await?;

    tracing::debug!(count = movies.len(), "query returned");
    Ok(movies)
  }

  async fn delete(&self, id: i64, cancel: &CancellationToken) -> Result<()> {
    let removed = self
      .call(cancel, move |conn, _| write::delete(conn, id))
      .await?;

    tracing::debug!(movie_id = id, removed, "deleted movie");
    Ok(())
  }
}

#[cfg(test)]
impl SqliteRepository {
  /// Run a scalar `SELECT count(*) ...` so tests can look at raw tables.
  pub(crate) async fn count(&self, sql: &'static str) -> i64 {
    self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await
      .expect("count query")
  }
}
