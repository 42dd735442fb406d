//! Handlers for the revision lifecycle endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/wonders/:id/edits` | Body: [`NewEdit`]; 201 + revision |
//! | `GET`  | `/wonders/:id/revisions` | Summaries, newest first |
//! | `GET`  | `/wonders/:id/revisions/compare?from=&to=` | Snapshot diff |
//! | `GET`  | `/wonders/:id/revisions/:version` | One applied revision |
//! | `POST` | `/wonders/:id/revisions/:rev/approve` | `:rev` is a revision id |
//! | `POST` | `/wonders/:id/revisions/:rev/reject` | Body: `{"reason":"..."}` |
//! | `POST` | `/wonders/:id/revisions/:rev/comments` | Body: `{"text":"..."}` |
//! | `POST` | `/wonders/:id/revisions/:rev/revert` | `:rev` is a version number |
//!
//! The `:id` segment accepts a UUID or a slug throughout.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wonders_core::{
  revision::{Revision, RevisionComment, RevisionComparison, RevisionSummary},
  store::WonderStore,
  wonder::Wonder,
};
use wonders_engine::NewEdit;

use crate::{AppState, actor::Actor, error::ApiError};

async fn wonder_id<S>(
  state: &AppState<S>,
  id_or_slug: &str,
) -> Result<Uuid, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(state.wonders.get_wonder(id_or_slug).await?.wonder_id)
}

/// `POST /wonders/:id/edits` — returns 201 + the new revision, which is
/// either pending or (for privileged editors) already applied.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
  Actor(actor): Actor,
  Json(body): Json<NewEdit>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let revision = state
    .moderation
    .submit_edit(actor.identity_id, wonder, body)
    .await?;
  Ok((StatusCode::CREATED, Json(revision)))
}

/// `GET /wonders/:id/revisions`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
) -> Result<Json<Vec<RevisionSummary>>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let summaries = state.moderation.list_revisions(wonder).await?;
  Ok(Json(summaries))
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
  pub from: u32,
  pub to:   u32,
}

/// `GET /wonders/:id/revisions/compare?from=<version>&to=<version>`
pub async fn compare<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
  Query(params): Query<CompareParams>,
) -> Result<Json<RevisionComparison>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let comparison = state
    .moderation
    .compare_revisions(wonder, params.from, params.to)
    .await?;
  Ok(Json(comparison))
}

/// `GET /wonders/:id/revisions/:version`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((id_or_slug, version)): Path<(String, u32)>,
) -> Result<Json<Revision>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let revision = state.moderation.get_revision(wonder, version).await?;
  Ok(Json(revision))
}

/// `POST /wonders/:id/revisions/:rev/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  Path((id_or_slug, revision_id)): Path<(String, Uuid)>,
  Actor(actor): Actor,
) -> Result<Json<Revision>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let revision = state
    .moderation
    .approve_revision(actor.identity_id, wonder, revision_id)
    .await?;
  Ok(Json(revision))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub reason: String,
}

/// `POST /wonders/:id/revisions/:rev/reject` — a reason is required.
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  Path((id_or_slug, revision_id)): Path<(String, Uuid)>,
  Actor(actor): Actor,
  Json(body): Json<RejectBody>,
) -> Result<Json<Revision>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let revision = state
    .moderation
    .reject_revision(actor.identity_id, wonder, revision_id, body.reason)
    .await?;
  Ok(Json(revision))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub text: String,
}

/// `POST /wonders/:id/revisions/:rev/comments` — returns 201 + the comment.
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  Path((_id_or_slug, revision_id)): Path<(String, Uuid)>,
  Actor(actor): Actor,
  Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<RevisionComment>), ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let comment = state
    .moderation
    .add_revision_comment(actor.identity_id, revision_id, body.text)
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// The restored wonder plus the revision recording the revert.
#[derive(Debug, Serialize)]
pub struct RevertResponse {
  pub wonder:   Wonder,
  pub revision: Revision,
}

/// `POST /wonders/:id/revisions/:version/revert`
pub async fn revert<S>(
  State(state): State<AppState<S>>,
  Path((id_or_slug, version)): Path<(String, u32)>,
  Actor(actor): Actor,
) -> Result<Json<RevertResponse>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = wonder_id(&state, &id_or_slug).await?;
  let (wonder, revision) = state
    .moderation
    .revert_to_version(actor.identity_id, wonder, version)
    .await?;
  Ok(Json(RevertResponse { wonder, revision }))
}
