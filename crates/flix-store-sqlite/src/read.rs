//! Read and query statements.
//!
//! Every read is one statement: the scalar movie columns plus one correlated
//! subquery per relation that folds the related names into a sorted JSON
//! array. Filters are static predicate fragments chosen by which
//! query fields are present, with all values bound as parameters.

use flix_core::{Movie, Query};
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{
  encode::{encode_date, RawMovie},
  schema::Relation,
  Result,
};

fn aggregate_column(relation: Relation) -> String {
  let dim = relation.dimension().table();
  let junction = relation.junction();
  let column = relation.dimension_column();
  format!(
    "(SELECT json_group_array({dim}.name ORDER BY {dim}.name)
      FROM {junction}
      JOIN {dim} ON {dim}.id = {junction}.{column}
      WHERE {junction}.movie_id = movies.id)"
  )
}

/// `SELECT ... FROM movies` with the column order [`RawMovie::from_row`]
/// expects.
fn select_movies() -> String {
  let aggregates = Relation::ALL
    .into_iter()
    .map(aggregate_column)
    .collect::<Vec<_>>()
    .join(",\n       ");
  format!(
    "SELECT movies.id, movies.title, movies.added_at, movies.rating,
       {aggregates}
     FROM movies"
  )
}

// ─── Predicates ──────────────────────────────────────────────────────────────

const SEARCH_PEOPLE: &str = "(
  EXISTS (
    SELECT 1 FROM movie_directors
    JOIN people ON people.id = movie_directors.person_id
    WHERE movie_directors.movie_id = movies.id AND INSTR(people.name, ?) > 0
  )
  OR EXISTS (
    SELECT 1 FROM movie_actors
    JOIN people ON people.id = movie_actors.person_id
    WHERE movie_actors.movie_id = movies.id AND INSTR(people.name, ?) > 0
  )
)";

const HAS_GENRE: &str = "EXISTS (
  SELECT 1 FROM movie_genres
  JOIN genres ON genres.id = movie_genres.genre_id
  WHERE movie_genres.movie_id = movies.id AND genres.name = ?
)";

const HAS_COUNTRY: &str = "EXISTS (
  SELECT 1 FROM movie_countries
  JOIN countries ON countries.id = movie_countries.country_id
  WHERE movie_countries.movie_id = movies.id AND countries.name = ?
)";

/// A statement and its positional parameters, in placeholder order.
#[derive(Debug)]
pub struct Select {
  pub sql:    String,
  pub params: Vec<Value>,
}

/// Build the filtered list statement for `query`.
pub fn build_query(query: &Query) -> Select {
  let mut conds: Vec<&'static str> = vec![];
  let mut params: Vec<Value> = vec![];

  if let Some(search) = query.search() {
    conds.push(SEARCH_PEOPLE);
    params.push(Value::Text(search.to_owned()));
    params.push(Value::Text(search.to_owned()));
  }
  if let Some(genre) = query.genre() {
    conds.push(HAS_GENRE);
    params.push(Value::Text(genre.to_owned()));
  }
  if let Some(country) = query.country() {
    conds.push(HAS_COUNTRY);
    params.push(Value::Text(country.to_owned()));
  }
  if let Some(after) = query.added_after() {
    conds.push("movies.added_at > ?");
    params.push(Value::Text(encode_date(after)));
  }
  if let Some(before) = query.added_before() {
    conds.push("movies.added_at < ?");
    params.push(Value::Text(encode_date(before)));
  }
  if let Some(min) = query.min_rating() {
    conds.push("movies.rating >= ?");
    params.push(Value::Real(min));
  }
  if let Some(max) = query.max_rating() {
    conds.push("movies.rating <= ?");
    params.push(Value::Real(max));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join("\n  AND "))
  };

  let limit_clause = match query.limit() {
    Some(limit) => {
      params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
      "LIMIT ?"
    }
    None => "",
  };

  let sql = format!(
    "{select}
     {where_clause}
     ORDER BY movies.title ASC
     {limit_clause}",
    select = select_movies(),
  );

  Select { sql, params }
}

// ─── Execution ───────────────────────────────────────────────────────────────

/// Fetch one movie; `None` when the id is absent.
pub fn read(conn: &Connection, id: i64) -> Result<Option<Movie>> {
  let sql = format!("{} WHERE movies.id = ?1", select_movies());
  let raw = conn
    .prepare_cached(&sql)?
    .query_row([id], RawMovie::from_row)
    .optional()?;
  raw.map(RawMovie::into_movie).transpose()
}

/// Run the filtered list statement for `query`.
pub fn query(conn: &Connection, query: &Query) -> Result<Vec<Movie>> {
  let Select { sql, params } = build_query(query);
  let mut stmt = conn.prepare_cached(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params_from_iter(params), RawMovie::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawMovie::into_movie).collect()
}
