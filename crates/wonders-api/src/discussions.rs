//! Handlers for discussion endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/wonders/:id/discussions` | Body: [`NewDiscussionBody`]; 201 |
//! | `GET`  | `/wonders/:id/discussions` | Newest first |
//! | `POST` | `/discussions/:id/comments` | Body: `{"text":"..."}` |
//! | `POST` | `/discussions/:id/vote` | Body: `{"vote":"up"\|"down"}` |
//! | `POST` | `/discussions/:id/resolve` | Creator or moderator |
//! | `POST` | `/discussions/:id/reopen` | Creator or moderator |
//! | `POST` | `/discussions/:id/archive` | Moderator-only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use wonders_core::{
  discussion::{Discussion, DiscussionKind, NewDiscussion, VoteKind},
  store::WonderStore,
};

use crate::{AppState, actor::Actor, error::ApiError};

/// JSON body accepted by `POST /wonders/:id/discussions`; the wonder comes
/// from the path.
#[derive(Debug, Deserialize)]
pub struct NewDiscussionBody {
  pub title:           String,
  pub content:         String,
  pub kind:            DiscussionKind,
  pub linked_revision: Option<Uuid>,
}

/// `POST /wonders/:id/discussions` — returns 201 + the new thread.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
  Actor(actor): Actor,
  Json(body): Json<NewDiscussionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = state.wonders.get_wonder(&id_or_slug).await?;
  let discussion = state
    .discussions
    .open_discussion(actor.identity_id, NewDiscussion {
      wonder_id:       wonder.wonder_id,
      title:           body.title,
      content:         body.content,
      kind:            body.kind,
      linked_revision: body.linked_revision,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(discussion)))
}

/// `GET /wonders/:id/discussions`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
) -> Result<Json<Vec<Discussion>>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = state.wonders.get_wonder(&id_or_slug).await?;
  let threads = state.discussions.list_for_wonder(wonder.wonder_id).await?;
  Ok(Json(threads))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub text: String,
}

/// `POST /discussions/:id/comments`
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Json(body): Json<CommentBody>,
) -> Result<Json<Discussion>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let discussion = state
    .discussions
    .comment(actor.identity_id, id, body.text)
    .await?;
  Ok(Json(discussion))
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub vote: VoteKind,
}

/// `POST /discussions/:id/vote` — replaces any earlier vote by the actor.
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Json(body): Json<VoteBody>,
) -> Result<Json<Discussion>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let discussion =
    state.discussions.vote(actor.identity_id, id, body.vote).await?;
  Ok(Json(discussion))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveBody {
  pub summary: Option<String>,
}

/// `POST /discussions/:id/resolve`
pub async fn resolve<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Json(body): Json<ResolveBody>,
) -> Result<Json<Discussion>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let discussion = state
    .discussions
    .resolve(actor.identity_id, id, body.summary)
    .await?;
  Ok(Json(discussion))
}

/// `POST /discussions/:id/reopen`
pub async fn reopen<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<Discussion>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let discussion = state.discussions.reopen(actor.identity_id, id).await?;
  Ok(Json(discussion))
}

/// `POST /discussions/:id/archive` — moderator-only.
pub async fn archive<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<Discussion>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let discussion = state.discussions.archive(actor.identity_id, id).await?;
  Ok(Json(discussion))
}
