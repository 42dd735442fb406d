//! The `WonderStore` trait.
//!
//! Implemented by storage backends (e.g. `wonders-store-sqlite`); the
//! moderation/reputation engines and the HTTP layer depend on this
//! abstraction, not on any concrete backend, so tests can inject doubles.
//!
//! All mutations are single-document read-modify-write with no optimistic
//! concurrency token. Known race, accepted by design: two concurrent
//! approvals touching the same section are last-write-wins. Backends that
//! funnel writes through one connection serialise the non-racing case.

use std::future::Future;

use uuid::Uuid;

use crate::{
  discussion::Discussion,
  identity::{Identity, NewIdentity},
  reputation::{EventKind, ReputationEvent},
  revision::{Revision, RevisionSummary},
  wonder::Wonder,
};

/// Abstraction over a BackyardWonders storage backend.
///
/// Revisions and reputation events are append-only: a revision's outcome
/// transitions exactly once via [`put_revision`](Self::put_revision), and
/// events are never updated or deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait WonderStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Create an identity with default role, privileges, and reputation.
  /// Called on first successful authentication.
  fn add_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Retrieve an identity by id. Returns `None` if not found.
  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Persist the full identity document (reputation, streak, profile).
  fn put_identity<'a>(
    &'a self,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Wonders ───────────────────────────────────────────────────────────

  /// Persist a fully-built wonder. The caller (the wonder service) owns
  /// slug derivation, which needs [`get_wonder_by_slug`](Self::get_wonder_by_slug)
  /// to probe for collisions.
  fn add_wonder<'a>(
    &'a self,
    wonder: &'a Wonder,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_wonder(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Wonder>, Self::Error>> + Send + '_;

  fn get_wonder_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Wonder>, Self::Error>> + Send + 'a;

  fn put_wonder<'a>(
    &'a self,
    wonder: &'a Wonder,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Revisions — append-only log ───────────────────────────────────────

  fn add_revision<'a>(
    &'a self,
    revision: &'a Revision,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_revision(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Revision>, Self::Error>> + Send + '_;

  /// Look up an applied revision by its `(wonder, version)` key. Pending
  /// and rejected revisions have no version and are never returned here.
  fn get_revision_by_version(
    &self,
    wonder_id: Uuid,
    version: u32,
  ) -> impl Future<Output = Result<Option<Revision>, Self::Error>> + Send + '_;

  /// Revision history for a wonder, newest first, with the heavy
  /// change/snapshot payload stripped.
  fn list_revisions(
    &self,
    wonder_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RevisionSummary>, Self::Error>> + Send + '_;

  /// Persist outcome transitions, version assignment, and comments for an
  /// existing revision. Change payloads are immutable once written.
  fn put_revision<'a>(
    &'a self,
    revision: &'a Revision,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reputation events — append-only ledger ────────────────────────────

  fn add_event<'a>(
    &'a self,
    event: &'a ReputationEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All-time count of `kind` events for an identity. Always recomputed
  /// from the ledger so milestone checks are self-correcting.
  fn count_events(
    &self,
    identity_id: Uuid,
    kind: EventKind,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Discussions ───────────────────────────────────────────────────────

  fn add_discussion<'a>(
    &'a self,
    discussion: &'a Discussion,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_discussion(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Discussion>, Self::Error>> + Send + '_;

  fn put_discussion<'a>(
    &'a self,
    discussion: &'a Discussion,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Discussions for a wonder, newest first.
  fn list_discussions(
    &self,
    wonder_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Discussion>, Self::Error>> + Send + '_;
}
