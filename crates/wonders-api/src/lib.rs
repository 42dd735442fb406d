//! JSON REST API for BackyardWonders.
//!
//! Exposes an axum [`Router`] backed by any
//! [`wonders_core::store::WonderStore`]. The upstream identity provider is
//! expected to forward the authenticated identity in the `X-Actor-Id`
//! header; TLS and transport concerns are the caller's responsibility.

pub mod actor;
pub mod discussions;
pub mod error;
pub mod identities;
pub mod revisions;
pub mod wonders;

use std::path::PathBuf;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use wonders_core::store::WonderStore;
use wonders_engine::{
  DiscussionService, ModerationEngine, ReputationEngine, WonderService,
};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with a
/// `WONDERS_`-prefixed environment overlay.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers: the raw store plus the
/// engines built over it.
#[derive(Clone)]
pub struct AppState<S: WonderStore + Clone> {
  pub store:       S,
  pub moderation:  ModerationEngine<S>,
  pub reputation:  ReputationEngine<S>,
  pub wonders:     WonderService<S>,
  pub discussions: DiscussionService<S>,
}

impl<S: WonderStore + Clone> AppState<S> {
  pub fn new(store: S) -> Self {
    Self {
      moderation:  ModerationEngine::new(store.clone()),
      reputation:  ReputationEngine::new(store.clone()),
      wonders:     WonderService::new(store.clone()),
      discussions: DiscussionService::new(store.clone()),
      store,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
///
/// The `{id}` segment of `/wonders/...` routes accepts a UUID or a slug.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Wonders
    .route("/wonders", post(wonders::create::<S>))
    .route("/wonders/{id}", get(wonders::get_one::<S>))
    .route("/wonders/{id}/ratings", post(wonders::rate::<S>))
    // Revisions
    .route("/wonders/{id}/edits", post(revisions::submit::<S>))
    .route("/wonders/{id}/revisions", get(revisions::list::<S>))
    .route(
      "/wonders/{id}/revisions/compare",
      get(revisions::compare::<S>),
    )
    .route("/wonders/{id}/revisions/{rev}", get(revisions::get_one::<S>))
    .route(
      "/wonders/{id}/revisions/{rev}/approve",
      post(revisions::approve::<S>),
    )
    .route(
      "/wonders/{id}/revisions/{rev}/reject",
      post(revisions::reject::<S>),
    )
    .route(
      "/wonders/{id}/revisions/{rev}/comments",
      post(revisions::comment::<S>),
    )
    .route(
      "/wonders/{id}/revisions/{rev}/revert",
      post(revisions::revert::<S>),
    )
    // Identities & reputation
    .route("/identities", post(identities::create::<S>))
    .route("/identities/{id}", get(identities::get_one::<S>))
    .route("/events", post(identities::record_event::<S>))
    // Discussions
    .route(
      "/wonders/{id}/discussions",
      get(discussions::list::<S>).post(discussions::create::<S>),
    )
    .route("/discussions/{id}/comments", post(discussions::comment::<S>))
    .route("/discussions/{id}/vote", post(discussions::vote::<S>))
    .route("/discussions/{id}/resolve", post(discussions::resolve::<S>))
    .route("/discussions/{id}/reopen", post(discussions::reopen::<S>))
    .route("/discussions/{id}/archive", post(discussions::archive::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
