//! Error type shared by the engine services.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The id-or-slug the caller asked for.
  #[error("wonder not found: {0}")]
  WonderNotFound(String),

  #[error("revision not found: {0}")]
  RevisionNotFound(Uuid),

  #[error("identity not found: {0}")]
  IdentityNotFound(Uuid),

  #[error("wonder {wonder} has no applied revision with version {version}")]
  VersionNotFound { wonder: Uuid, version: u32 },

  #[error("discussion not found: {0}")]
  DiscussionNotFound(Uuid),

  #[error("revision {0} has already been approved or rejected")]
  AlreadyResolved(Uuid),

  #[error("identity {actor} is not authorized to {action}")]
  PermissionDenied { actor: Uuid, action: &'static str },

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Store failures in critical paths are fatal to
  /// the caller; nothing downstream inspects them.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

impl From<wonders_core::Error> for Error {
  fn from(err: wonders_core::Error) -> Self {
    use wonders_core::Error as Core;
    match err {
      Core::WonderNotFound(id) => Self::WonderNotFound(id.to_string()),
      Core::IdentityNotFound(id) => Self::IdentityNotFound(id),
      Core::RevisionNotFound(id) => Self::RevisionNotFound(id),
      Core::VersionNotFound { wonder, version } => {
        Self::VersionNotFound { wonder, version }
      }
      Core::DiscussionNotFound(id) => Self::DiscussionNotFound(id),
      Core::AlreadyResolved(id) => Self::AlreadyResolved(id),
      Core::Validation(msg) => Self::Validation(msg),
      Core::UnknownDiscriminant(d) => {
        Self::Validation(format!("unknown discriminant: {d:?}"))
      }
      Core::Serialization(e) => Self::store(e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
