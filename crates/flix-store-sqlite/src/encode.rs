//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings, which keeps lexical and
//! chronological order identical. Relation names travel as JSON arrays in
//! both directions: batch parameters on write, `json_group_array` aggregates
//! on read.

use chrono::NaiveDate;
use flix_core::Movie;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Name batches ────────────────────────────────────────────────────────────

/// Encode a batch as a JSON array; statements expand it with `json_each`.
pub fn encode_batch<T: serde::Serialize>(items: &[T]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

/// Decode a relation aggregate back into names.
///
/// A movie without related rows yields `[]`; `NULL` and an empty string are
/// accepted as empty lists too.
pub fn decode_names(aggregate: Option<String>) -> Result<Vec<String>> {
  match aggregate {
    Some(s) if !s.is_empty() => Ok(serde_json::from_str(&s)?),
    _ => Ok(Vec::new()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `movies` row and its four aggregates.
pub struct RawMovie {
  pub id:        i64,
  pub title:     String,
  pub added_at:  String,
  pub rating:    f64,
  pub directors: Option<String>,
  pub actors:    Option<String>,
  pub countries: Option<String>,
  pub genres:    Option<String>,
}

impl RawMovie {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      title:     row.get(1)?,
      added_at:  row.get(2)?,
      rating:    row.get(3)?,
      directors: row.get(4)?,
      actors:    row.get(5)?,
      countries: row.get(6)?,
      genres:    row.get(7)?,
    })
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      id:        self.id,
      title:     self.title,
      added_at:  decode_date(&self.added_at)?,
      directors: decode_names(self.directors)?,
      actors:    decode_names(self.actors)?,
      countries: decode_names(self.countries)?,
      rating:    self.rating,
      genres:    decode_names(self.genres)?,
    })
  }
}
