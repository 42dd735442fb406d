//! Actor resolution.
//!
//! The identity provider sits in front of this service; it forwards the
//! authenticated identity's UUID in the `X-Actor-Id` header. The [`Actor`]
//! extractor resolves that header to a full [`Identity`], rejecting with
//! 401 when the header is missing, malformed, or unknown.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;
use wonders_core::{identity::Identity, store::WonderStore};

use crate::{AppState, error::ApiError};

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The authenticated identity making the request.
#[derive(Debug, Clone)]
pub struct Actor(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| {
        ApiError::Unauthorized("missing X-Actor-Id header".to_string())
      })?;
    let id = Uuid::parse_str(header).map_err(|_| {
      ApiError::Unauthorized("malformed X-Actor-Id header".to_string())
    })?;
    let identity = state
      .store
      .get_identity(id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or_else(|| ApiError::Unauthorized(format!("unknown actor {id}")))?;
    Ok(Actor(identity))
  }
}
