//! Handlers for `/users/:id/thoughts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id/thoughts` | Newest first |
//! | `POST` | `/users/:id/thoughts` | Body: `{"text":"..."}` |
//! | `POST` | `/users/:id/thoughts/:thought_id/insights` | Body: `{"text":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use moodlog_core::{store::JournalStore, thought::Thought};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ThoughtBody {
  pub text: String,
}

/// `GET /users/:id/thoughts`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Thought>>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let thoughts = store
    .list_thoughts(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(thoughts))
}

/// `POST /users/:id/thoughts` — returns 201 + the stored thought.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ThoughtBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let thought = store
    .add_thought(id, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(thought)))
}

/// `POST /users/:id/thoughts/:thought_id/insights`
pub async fn attach_insights<S>(
  State(store): State<Arc<S>>,
  Path((id, thought_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ThoughtBody>,
) -> Result<Json<Thought>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let thought = store
    .attach_thought_insights(id, thought_id, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(thought))
}
