//! Core types and trait definitions for the flix movie catalog.
//!
//! This crate is deliberately free of database dependencies. Storage
//! backends implement [`store::MovieRepository`]; callers depend on that
//! abstraction, not on any concrete backend.

pub mod error;
pub mod movie;
pub mod store;

pub use error::{Error, Result};
pub use movie::{Movie, unique};
pub use store::{MovieRepository, Query};
