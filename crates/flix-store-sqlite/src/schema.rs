//! SQL schema for the flix SQLite store, plus the table names each movie
//! relation maps onto.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout version; there are no migrations, a changed layout means a fresh
//! database.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS movies (
    id        INTEGER PRIMARY KEY,   -- caller-supplied, never generated
    title     TEXT NOT NULL,
    added_at  TEXT NOT NULL,         -- YYYY-MM-DD
    rating    REAL NOT NULL
);

-- Dimension tables: one row per distinct name, shared across movies.
-- Rows are created on first reference and never deleted.
CREATE TABLE IF NOT EXISTS people (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS countries (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS genres (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

-- Junction tables. Deleting a movie cascades to all four.
CREATE TABLE IF NOT EXISTS movie_directors (
    movie_id   INTEGER NOT NULL REFERENCES movies (id) ON DELETE CASCADE,
    person_id  INTEGER NOT NULL REFERENCES people (id) ON DELETE CASCADE,
    PRIMARY KEY (movie_id, person_id)
);

CREATE TABLE IF NOT EXISTS movie_actors (
    movie_id   INTEGER NOT NULL REFERENCES movies (id) ON DELETE CASCADE,
    person_id  INTEGER NOT NULL REFERENCES people (id) ON DELETE CASCADE,
    PRIMARY KEY (movie_id, person_id)
);

CREATE TABLE IF NOT EXISTS movie_countries (
    movie_id    INTEGER NOT NULL REFERENCES movies (id) ON DELETE CASCADE,
    country_id  INTEGER NOT NULL REFERENCES countries (id) ON DELETE CASCADE,
    PRIMARY KEY (movie_id, country_id)
);

CREATE TABLE IF NOT EXISTS movie_genres (
    movie_id  INTEGER NOT NULL REFERENCES movies (id) ON DELETE CASCADE,
    genre_id  INTEGER NOT NULL REFERENCES genres (id) ON DELETE CASCADE,
    PRIMARY KEY (movie_id, genre_id)
);

PRAGMA user_version = 1;
";

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// A table of unique names shared across movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
  People,
  Countries,
  Genres,
}

impl Dimension {
  pub fn table(self) -> &'static str {
    match self {
      Self::People => "people",
      Self::Countries => "countries",
      Self::Genres => "genres",
    }
  }
}

// ─── Relations ───────────────────────────────────────────────────────────────

/// One of a movie's four many-to-many relations.
///
/// Directors and actors share the `people` dimension but keep separate
/// junction tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
  Directors,
  Actors,
  Countries,
  Genres,
}

impl Relation {
  pub const ALL: [Relation; 4] =
    [Self::Directors, Self::Actors, Self::Countries, Self::Genres];

  pub fn dimension(self) -> Dimension {
    match self {
      Self::Directors | Self::Actors => Dimension::People,
      Self::Countries => Dimension::Countries,
      Self::Genres => Dimension::Genres,
    }
  }

  pub fn junction(self) -> &'static str {
    match self {
      Self::Directors => "movie_directors",
      Self::Actors => "movie_actors",
      Self::Countries => "movie_countries",
      Self::Genres => "movie_genres",
    }
  }

  /// The junction column referencing the dimension row.
  pub fn dimension_column(self) -> &'static str {
    match self {
      Self::Directors | Self::Actors => "person_id",
      Self::Countries => "country_id",
      Self::Genres => "genre_id",
    }
  }
}
