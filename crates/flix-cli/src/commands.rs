//! Command implementations, kept apart from argument parsing so they can be
//! driven from tests against an in-memory catalog.

use std::{io, path::Path};

use anyhow::{Context as _, Result, bail};
use flix_core::{Movie, MovieRepository, Query};
use flix_store_sqlite::SqliteRepository;
use tokio_util::sync::CancellationToken;

/// Outcome of a catalog load.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
  pub created: usize,
  /// Records whose id was already in the catalog.
  pub skipped: usize,
}

pub async fn load_file(
  repo: &SqliteRepository,
  path: &Path,
  cancel: &CancellationToken,
) -> Result<LoadSummary> {
  let reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .from_path(path)
    .with_context(|| format!("opening {}", path.display()))?;
  load(repo, reader, cancel).await
}

/// Create one movie per CSV record. The header row is skipped.
///
/// Every record is parsed before it reaches the store; a malformed record
/// stops the load. Duplicate ids are logged and skipped.
pub async fn load<R: io::Read>(
  repo: &SqliteRepository,
  mut reader: csv::Reader<R>,
  cancel: &CancellationToken,
) -> Result<LoadSummary> {
  let mut summary = LoadSummary::default();

  for (index, record) in reader.records().enumerate() {
    // Line 1 is the header.
    let line = index + 2;
    let record = record.with_context(|| format!("reading line {line}"))?;
    let fields: Vec<&str> = record.iter().collect();
    let movie = Movie::from_record(&fields)
      .with_context(|| format!("parsing line {line}"))?;

    match repo.create(&movie, cancel).await {
      Ok(()) => summary.created += 1,
      Err(e) if e.is_conflict() => {
        tracing::warn!(movie_id = movie.id, line, "duplicate movie id, skipping");
        summary.skipped += 1;
      }
      Err(e) if e.is_cancelled() => {
        bail!("load cancelled after {} movies", summary.created)
      }
      Err(e) => {
        return Err(e).with_context(|| format!("storing movie {} (line {line})", movie.id));
      }
    }
  }

  Ok(summary)
}

pub async fn query(
  repo: &SqliteRepository,
  query: &Query,
  cancel: &CancellationToken,
) -> Result<Vec<Movie>> {
  repo.query(query, cancel).await.context("query failed")
}

pub async fn read(
  repo: &SqliteRepository,
  id: i64,
  cancel: &CancellationToken,
) -> Result<Movie> {
  match repo.read(id, cancel).await {
    Ok(movie) => Ok(movie),
    Err(e) if e.is_not_found() => bail!("no movie with id {id}"),
    Err(e) => Err(e).with_context(|| format!("reading movie {id}")),
  }
}

pub async fn delete(
  repo: &SqliteRepository,
  id: i64,
  cancel: &CancellationToken,
) -> Result<()> {
  repo
    .delete(id, cancel)
    .await
    .with_context(|| format!("deleting movie {id}"))
}
