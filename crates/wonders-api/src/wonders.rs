//! Handlers for `/wonders` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/wonders` | Body: [`NewWonder`]; returns 201 + stored wonder |
//! | `GET`  | `/wonders/:id_or_slug` | By UUID, falling back to slug |
//! | `POST` | `/wonders/:id_or_slug/ratings` | Body: [`RatingBody`] |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use wonders_core::{
  store::WonderStore,
  wonder::{NewWonder, Wonder},
};
use serde::Deserialize;

use crate::{AppState, actor::Actor, error::ApiError};

/// `POST /wonders` — returns 201 + the stored wonder.
///
/// Image bytes travel over a separate multipart surface in front of this
/// service; creation through this endpoint starts without photos.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<NewWonder>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = state
    .wonders
    .create_wonder(actor.identity_id, body, Vec::new())
    .await?;
  Ok((StatusCode::CREATED, Json(wonder)))
}

/// `GET /wonders/:id_or_slug`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
) -> Result<Json<Wonder>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = state.wonders.get_wonder(&id_or_slug).await?;
  Ok(Json(wonder))
}

/// JSON body accepted by `POST /wonders/:id_or_slug/ratings`.
#[derive(Debug, Deserialize)]
pub struct RatingBody {
  /// 1–5 inclusive.
  pub rating:  u8,
  pub comment: Option<String>,
}

/// `POST /wonders/:id_or_slug/ratings` — upserts the actor's rating.
pub async fn rate<S>(
  State(state): State<AppState<S>>,
  Path(id_or_slug): Path<String>,
  Actor(actor): Actor,
  Json(body): Json<RatingBody>,
) -> Result<Json<Wonder>, ApiError>
where
  S: WonderStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let wonder = state
    .wonders
    .rate_wonder(actor.identity_id, &id_or_slug, body.rating, body.comment)
    .await?;
  Ok(Json(wonder))
}
