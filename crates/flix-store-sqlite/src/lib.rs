//! SQLite backend for the flix movie catalog.
//!
//! Hand-written SQL over [`rusqlite`], wrapped in [`tokio_rusqlite`] so all
//! database access runs on a dedicated thread without blocking the async
//! runtime. Names of people, countries and genres are interned into shared
//! dimension tables; reads fold each relation back into one aggregate column.

mod abort;
mod encode;
mod intern;
mod read;
mod schema;
mod store;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRepository;

#[cfg(test)]
mod tests;
