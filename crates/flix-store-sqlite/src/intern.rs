//! Dimension interning and junction linking.
//!
//! Both operations take their whole batch as one JSON-array parameter, so the
//! statement text depends only on the table, never on how many names are
//! involved, and each batch costs a single round trip.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
  encode::encode_batch,
  schema::{Dimension, Relation},
  Error, Result,
};

fn upsert_sql(dimension: Dimension) -> String {
  // `WHERE true` disambiguates the upsert clause from a join constraint.
  format!(
    "INSERT INTO {table} (name)
     SELECT value FROM json_each(?1) WHERE true
     ON CONFLICT (name) DO UPDATE SET name = excluded.name
     RETURNING id, name",
    table = dimension.table(),
  )
}

fn link_sql(relation: Relation) -> String {
  format!(
    "INSERT INTO {junction} (movie_id, {column})
     SELECT DISTINCT ?1, value FROM json_each(?2)",
    junction = relation.junction(),
    column = relation.dimension_column(),
  )
}

/// Resolve `names` to row ids in `dimension`, inserting the names not seen
/// before.
///
/// `ids[i]` belongs to `names[i]`. A name repeated within the batch resolves
/// to the same id each time. An empty batch issues no statement.
pub fn intern(
  conn: &Connection,
  dimension: Dimension,
  names: &[String],
) -> Result<Vec<i64>> {
  if names.is_empty() {
    return Ok(Vec::new());
  }

  let batch = encode_batch(names)?;
  let mut stmt = conn.prepare_cached(&upsert_sql(dimension))?;

  // RETURNING order is not guaranteed to follow input order; key by name.
  let resolved = stmt
    .query_map([batch], |row| {
      Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?))
    })?
    .collect::<rusqlite::Result<HashMap<_, _>>>()?;

  names
    .iter()
    .map(|name| {
      resolved.get(name).copied().ok_or_else(|| Error::Unresolved {
        table: dimension.table(),
        name:  name.clone(),
      })
    })
    .collect()
}

/// Link `movie_id` to every id in `ids` through the relation's junction table.
///
/// Returns the number of junction rows inserted; repeated ids link once.
pub fn link(
  conn: &Connection,
  relation: Relation,
  movie_id: i64,
  ids: &[i64],
) -> Result<usize> {
  if ids.is_empty() {
    return Ok(0);
  }

  let batch = encode_batch(ids)?;
  let inserted = conn
    .prepare_cached(&link_sql(relation))?
    .execute(rusqlite::params![movie_id, batch])?;
  Ok(inserted)
}
