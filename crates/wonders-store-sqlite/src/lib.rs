//! SQLite backend for the BackyardWonders store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Documents (identities, wonders,
//! revisions, events, discussions) are stored as JSON columns next to the
//! scalar columns the store indexes on (ids, slugs, versions, event kinds).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
