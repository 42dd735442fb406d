//! Handlers for `/identities` and `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/identities` | First-login provisioning; body: [`NewIdentity`] |
//! | `GET`  | `/identities/:id` | Full identity incl. reputation |
//! | `POST` | `/events` | Moderator-only manual ledger entry |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use wonders_core::{
  identity::{Identity, NewIdentity},
  reputation::{NewReputationEvent, ReputationEvent},
  store::WonderStore,
};

use crate::{AppState, actor::Actor, error::ApiError};

/// `POST /identities` — called by the identity provider on first login.
/// Returns 201 + the provisioned identity with default role and privileges.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewIdentity>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let identity = state
    .store
    .add_identity(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(identity)))
}

/// `GET /identities/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Identity>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let identity = state
    .store
    .get_identity(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("identity {id} not found")))?;
  Ok(Json(identity))
}

/// `POST /events` — record a reputation event by hand (e.g. a helpful
/// review or photo approval flagged by a moderator). Moderator-only.
pub async fn record_event<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<NewReputationEvent>,
) -> Result<(StatusCode, Json<ReputationEvent>), ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !actor.can_moderate() {
    return Err(ApiError::Forbidden(format!(
      "identity {} is not authorized to record events",
      actor.identity_id
    )));
  }
  let event = state.reputation.record_event(body).await?;
  Ok((StatusCode::CREATED, Json(event)))
}
