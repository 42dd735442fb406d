//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<wonders_engine::Error> for ApiError {
  fn from(err: wonders_engine::Error) -> Self {
    use wonders_engine::Error as Engine;
    match err {
      Engine::WonderNotFound(_)
      | Engine::RevisionNotFound(_)
      | Engine::IdentityNotFound(_)
      | Engine::VersionNotFound { .. }
      | Engine::DiscussionNotFound(_) => Self::NotFound(err.to_string()),
      Engine::PermissionDenied { .. } => Self::Forbidden(err.to_string()),
      Engine::Validation(_) => Self::BadRequest(err.to_string()),
      Engine::AlreadyResolved(_) => Self::Conflict(err.to_string()),
      Engine::Store(e) => Self::Store(e),
    }
  }
}
