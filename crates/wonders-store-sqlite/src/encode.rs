//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Documents are stored as
//! compact JSON in a `doc` column. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── JSON documents ──────────────────────────────────────────────────────────

pub fn encode_doc<T: Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_doc<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}
