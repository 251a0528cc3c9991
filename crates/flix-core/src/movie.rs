//! The movie record and its normalization rules.
//!
//! A movie carries four multi-valued relations (directors, actors, countries,
//! genres). Each is kept as a sorted, deduplicated list of non-empty names so
//! that a movie read back from storage compares equal to the one written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Movie ───────────────────────────────────────────────────────────────────

/// A single catalog entry.
///
/// `id` is supplied by the caller; the store never generates movie ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id:        i64,
  pub title:     String,
  /// Calendar date the movie was added; no time-of-day component.
  pub added_at:  NaiveDate,
  pub directors: Vec<String>,
  pub actors:    Vec<String>,
  pub countries: Vec<String>,
  /// Nominally 0–10; not validated.
  pub rating:    f64,
  pub genres:    Vec<String>,
}

// ─── Record parsing ──────────────────────────────────────────────────────────

// Column positions in a catalog record. The gaps are columns the catalog
// carries but the movie model does not use.
const COL_ID: usize = 0;
const COL_TITLE: usize = 2;
const COL_DIRECTORS: usize = 3;
const COL_ACTORS: usize = 4;
const COL_COUNTRIES: usize = 5;
const COL_ADDED_AT: usize = 6;
const COL_RATING: usize = 8;
const COL_GENRES: usize = 10;

/// Separator between names inside one multi-valued column.
const LIST_SEPARATOR: &str = ", ";

impl Movie {
  /// Build a movie from one catalog record.
  ///
  /// Multi-valued columns are `", "`-separated and normalized with
  /// [`unique`]. The date column must be `YYYY-MM-DD`.
  pub fn from_record<S: AsRef<str>>(record: &[S]) -> Result<Self> {
    let col = |i: usize| {
      record
        .get(i)
        .map(AsRef::as_ref)
        .ok_or(Error::MissingColumn(i))
    };

    let id_str = col(COL_ID)?;
    let id = id_str
      .trim()
      .parse::<i64>()
      .map_err(|_| Error::InvalidId(id_str.to_owned()))?;

    let added_str = col(COL_ADDED_AT)?;
    let added_at = NaiveDate::parse_from_str(added_str.trim(), "%Y-%m-%d")
      .map_err(|_| Error::InvalidDate(added_str.to_owned()))?;

    let rating_str = col(COL_RATING)?;
    let rating = rating_str
      .trim()
      .parse::<f64>()
      .map_err(|_| Error::InvalidRating(rating_str.to_owned()))?;

    Ok(Self {
      id,
      title: col(COL_TITLE)?.to_owned(),
      added_at,
      directors: split_list(col(COL_DIRECTORS)?),
      actors: split_list(col(COL_ACTORS)?),
      countries: split_list(col(COL_COUNTRIES)?),
      rating,
      genres: split_list(col(COL_GENRES)?),
    })
  }
}

fn split_list(column: &str) -> Vec<String> {
  unique(column.split(LIST_SEPARATOR).map(str::to_owned))
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Sort `names` lexicographically, drop duplicates and drop empty strings.
///
/// Comparison is byte-wise and case-sensitive, so `"abc"` and `"ABC"` are
/// distinct names.
pub fn unique<I>(names: I) -> Vec<String>
where
  I: IntoIterator<Item = String>,
{
  let mut out: Vec<String> =
    names.into_iter().filter(|n| !n.is_empty()).collect();
  out.sort_unstable();
  out.dedup();
  out
}
