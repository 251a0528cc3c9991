//! Per-operation abort flag shared between the async caller and the database
//! thread.
//!
//! The repository trips the flag when the caller's cancellation token fires.
//! On the database side the flag is polled by an SQLite progress handler, so
//! a long-running statement is interrupted, and checked explicitly before any
//! commit. Each operation gets its own flag: the connection is shared, and
//! cancelling one caller must not interrupt another caller's statement.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use rusqlite::Connection;

use crate::{Error, Result};

/// Virtual-machine instructions between progress handler calls.
const PROGRESS_OPS: i32 = 1_000;

#[derive(Debug, Clone, Default)]
pub struct Abort(Arc<AtomicBool>);

impl Abort {
  pub fn trip(&self) { self.0.store(true, Ordering::Release); }

  pub fn is_tripped(&self) -> bool { self.0.load(Ordering::Acquire) }

  /// `Err(Cancelled)` once the flag is tripped.
  pub fn check(&self) -> Result<()> {
    if self.is_tripped() {
      return Err(Error::Cancelled);
    }
    Ok(())
  }
}

/// Run `op` with the progress handler watching `abort`.
///
/// Statement failures caused by the interrupt surface as
/// [`Error::Cancelled`].
pub fn with_abort<T>(
  conn: &mut Connection,
  abort: &Abort,
  op: impl FnOnce(&mut Connection, &Abort) -> Result<T>,
) -> Result<T> {
  abort.check()?;

  let flag = abort.0.clone();
  conn.progress_handler(
    PROGRESS_OPS,
    Some(move || flag.load(Ordering::Acquire)),
  );

  let out = op(conn, abort);

  conn.progress_handler(0, None::<fn() -> bool>);

  out.map_err(|e| {
    if abort.is_tripped() && e.is_interrupted() {
      Error::Cancelled
    } else {
      e
    }
  })
}
