//! The `MovieRepository` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `flix-store-sqlite`).
//! Higher layers (`flix-cli`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::movie::Movie;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`MovieRepository::query`].
///
/// Every filter is optional and the present ones are ANDed. A present filter
/// holding its zero value (empty string, rating `<= 0`, limit `0`) is treated
/// as absent; use the accessor methods rather than the raw fields so every
/// backend applies that rule the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
  /// Case-sensitive substring matched against director and actor names.
  pub search:       Option<String>,
  /// Exact genre name.
  pub genre:        Option<String>,
  /// Exact country name.
  pub country:      Option<String>,
  /// Exclusive lower bound on `added_at`.
  pub added_after:  Option<NaiveDate>,
  /// Exclusive upper bound on `added_at`.
  pub added_before: Option<NaiveDate>,
  /// Inclusive lower bound on `rating`.
  pub min_rating:   Option<f64>,
  /// Inclusive upper bound on `rating`.
  pub max_rating:   Option<f64>,
  /// Maximum number of movies returned, applied after ordering by title.
  pub limit:        Option<usize>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
  s.as_deref().filter(|s| !s.is_empty())
}

fn positive(r: Option<f64>) -> Option<f64> { r.filter(|r| *r > 0.0) }

impl Query {
  pub fn search(&self) -> Option<&str> { non_empty(&self.search) }

  pub fn genre(&self) -> Option<&str> { non_empty(&self.genre) }

  pub fn country(&self) -> Option<&str> { non_empty(&self.country) }

  pub fn added_after(&self) -> Option<NaiveDate> { self.added_after }

  pub fn added_before(&self) -> Option<NaiveDate> { self.added_before }

  pub fn min_rating(&self) -> Option<f64> { positive(self.min_rating) }

  pub fn max_rating(&self) -> Option<f64> { positive(self.max_rating) }

  pub fn limit(&self) -> Option<usize> { self.limit.filter(|l| *l > 0) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a movie catalog backend.
///
/// Every operation takes the caller's [`CancellationToken`]. When it fires
/// the backend aborts the in-flight work, rolls back any open transaction and
/// returns a cancellation error distinguishable from a store failure.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait MovieRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a movie together with its directors, actors, countries and
  /// genres, atomically. Fails if a movie with the same id already exists.
  fn create<'a>(
    &'a self,
    movie: &'a Movie,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Fetch one movie by id. Fails with a not-found error if it is absent.
  fn read<'a>(
    &'a self,
    id: i64,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + 'a;

  /// List movies matching `query`, ordered ascending by title.
  fn query<'a>(
    &'a self,
    query: &'a Query,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + 'a;

  /// Remove a movie and its relation rows. Removing an absent id succeeds.
  fn delete<'a>(
    &'a self,
    id: i64,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
