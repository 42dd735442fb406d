//! Business logic for BackyardWonders, generic over any
//! [`wonders_core::store::WonderStore`].
//!
//! Four services, each a thin handle around a shared store:
//!
//! - [`ModerationEngine`] — the revision lifecycle state machine
//!   (submit → auto-apply or pend → approve/reject → revert).
//! - [`ReputationEngine`] — the append-only point ledger, level formula,
//!   and milestone badge dispatch.
//! - [`WonderService`] — wonder creation (slug derivation, media upload
//!   with placeholder degradation) and ratings.
//! - [`DiscussionService`] — threaded discussion attached to a wonder.
//!
//! All state changes are read-modify-write against the store; badge and
//! achievement awarding happens synchronously inside the triggering
//! operation (this is a low-volume moderation workflow, not a hot path).

pub mod discussions;
pub mod error;
pub mod media;
pub mod moderation;
pub mod reputation;
pub mod wonders;

pub use discussions::DiscussionService;
pub use error::{Error, Result};
pub use media::{
  MediaError, MediaStore, PLACEHOLDER_IMAGE_URL, PlaceholderMediaStore,
};
pub use moderation::{ModerationEngine, NewEdit};
pub use reputation::ReputationEngine;
pub use wonders::{ImageUpload, WonderService};

/// Fixed reward for an approved edit, attributed to the original editor.
pub const EDIT_APPROVED_POINTS: i64 = 10;

/// Fixed reward for contributing a new wonder.
pub const WONDER_ADDED_POINTS: i64 = 25;

/// Fixed reward when an activity streak reaches a milestone length.
pub const EDIT_STREAK_POINTS: i64 = 5;
