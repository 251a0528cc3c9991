//! Human-readable and JSON rendering of movies on stdout.

use std::io::{self, Write as _};

use anyhow::Result;
use flix_core::Movie;

/// A short block per movie: id, title, date and rating, then the relations.
pub fn movie_line(m: &Movie) -> String {
  format!(
    "{:>8}  {}  ({})  {}\n          directed by: {}\n          starring:    {}\n          countries:   {}\n          genres:      {}",
    m.id,
    m.title,
    m.added_at,
    m.rating,
    join(&m.directors),
    join(&m.actors),
    join(&m.countries),
    join(&m.genres),
  )
}

fn join(names: &[String]) -> String {
  if names.is_empty() {
    "-".to_owned()
  } else {
    names.join(", ")
  }
}

pub fn print_movies(movies: &[Movie], json: bool) -> Result<()> {
  let stdout = io::stdout();
  let mut out = stdout.lock();

  if json {
    serde_json::to_writer_pretty(&mut out, movies)?;
    writeln!(out)?;
    return Ok(());
  }

  for m in movies {
    writeln!(out, "{}", movie_line(m))?;
  }
  writeln!(out, "{} movie(s)", movies.len())?;
  Ok(())
}
