//! Error types for `wonders-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("wonder not found: {0}")]
  WonderNotFound(Uuid),

  #[error("identity not found: {0}")]
  IdentityNotFound(Uuid),

  #[error("revision not found: {0}")]
  RevisionNotFound(Uuid),

  #[error("wonder {wonder} has no applied revision with version {version}")]
  VersionNotFound { wonder: Uuid, version: u32 },

  #[error("discussion not found: {0}")]
  DiscussionNotFound(Uuid),

  #[error("revision {0} has already been approved or rejected")]
  AlreadyResolved(Uuid),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("unknown discriminant: {0:?}")]
  UnknownDiscriminant(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
