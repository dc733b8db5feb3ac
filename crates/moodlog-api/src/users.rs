//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: [`SignupBody`]; `premium` opens the trial too |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `DELETE` | `/users/:id` | Cascades to subscription, entries, thoughts |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use moodlog_core::{
  store::JournalStore,
  subscription::Subscription,
  user::{NewUser, User},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users`.
pub type SignupBody = NewUser;

#[derive(Debug, Serialize)]
pub struct SignupResponse {
  pub user:         User,
  /// Present iff the signup opted into premium.
  pub subscription: Option<Subscription>,
}

/// `POST /users` — returns 201 + the stored user (and trial subscription
/// when premium was requested).
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let (user, subscription) = store
    .add_user(body, Utc::now())
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(SignupResponse { user, subscription })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:id` — hard delete, cascading to everything the user
/// owns.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store.delete_user(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
