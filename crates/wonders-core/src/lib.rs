//! Core types and trait definitions for the BackyardWonders wiki/map store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod discussion;
pub mod error;
pub mod identity;
pub mod reputation;
pub mod revision;
pub mod store;
pub mod wonder;

pub use error::{Error, Result};
