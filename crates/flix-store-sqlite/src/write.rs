//! Create and delete, each one transaction on the calling connection.

use flix_core::{Movie, unique};
use rusqlite::{Connection, ErrorCode, Transaction, ffi};

use crate::{
  abort::Abort,
  encode::encode_date,
  intern::{intern, link},
  schema::Relation,
  Error, Result,
};

const INSERT_MOVIE: &str =
  "INSERT INTO movies (id, title, added_at, rating) VALUES (?1, ?2, ?3, ?4)";

const DELETE_MOVIE: &str = "DELETE FROM movies WHERE id = ?1";

fn relation_names(movie: &Movie, relation: Relation) -> &[String] {
  match relation {
    Relation::Directors => &movie.directors,
    Relation::Actors => &movie.actors,
    Relation::Countries => &movie.countries,
    Relation::Genres => &movie.genres,
  }
}

fn is_primary_key_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e.sqlite_error(),
    Some(ffi::Error { code: ErrorCode::ConstraintViolation, extended_code, .. })
      if *extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// Insert `movie`, intern its names and link them, all or nothing.
///
/// The movie row goes in first since every junction row references it.
pub fn create(conn: &mut Connection, movie: &Movie, abort: &Abort) -> Result<()> {
  let tx = conn.transaction()?;

  match insert_all(&tx, movie).and_then(|()| abort.check()) {
    Ok(()) => {
      tx.commit()?;
      Ok(())
    }
    Err(e) => Err(rollback(tx, e)),
  }
}

fn insert_all(tx: &Transaction<'_>, movie: &Movie) -> Result<()> {
  tx.prepare_cached(INSERT_MOVIE)?
    .execute(rusqlite::params![
      movie.id,
      movie.title,
      encode_date(movie.added_at),
      movie.rating,
    ])
    .map_err(|e| {
      if is_primary_key_violation(&e) {
        Error::Conflict(movie.id)
      } else {
        Error::Sqlite(e)
      }
    })?;

  for relation in Relation::ALL {
    // Reads return sorted, deduplicated names; store exactly that set.
    let names = unique(relation_names(movie, relation).iter().cloned());
    if names.is_empty() {
      continue;
    }

    let ids = intern(tx, relation.dimension(), &names)?;
    let linked = link(tx, relation, movie.id, &ids)?;
    tracing::trace!(
      movie_id = movie.id,
      junction = relation.junction(),
      linked,
      "linked relation"
    );
  }

  Ok(())
}

/// Roll `tx` back after `err`, keeping `err` as the primary error.
fn rollback(tx: Transaction<'_>, err: Error) -> Error {
  // An interrupted write makes SQLite roll the transaction back itself.
  if tx.is_autocommit() {
    return err;
  }

  match tx.rollback() {
    Ok(()) => err,
    Err(rollback) => {
      tracing::warn!(error = %err, %rollback, "rollback failed");
      Error::Rollback { source: Box::new(err), rollback }
    }
  }
}

/// Delete a movie by id. Junction rows go with it through the cascading
/// foreign keys; dimension rows stay. Returns the number of movies removed.
pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
  Ok(conn.prepare_cached(DELETE_MOVIE)?.execute([id])?)
}
