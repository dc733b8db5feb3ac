//! Handlers for `/users/:id/subscription` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id/subscription` | Status re-derived as of now; 404 if none |
//! | `POST` | `/users/:id/subscription` | Opens the 7-day trial; 409 if one is live |
//! | `POST` | `/users/:id/subscription/cancel` | 400 if already cancelled |
//! | `POST` | `/users/:id/subscription/reactivate` | 400 unless cancelled |

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
  subscription::{EvaluatedSubscription, Subscription},
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /users/:id/subscription`
///
/// Reading is what advances a lapsed trial: the store evaluates the
/// record against the current instant and persists any transition before
/// this handler returns it.
pub async fn status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<EvaluatedSubscription>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let eval = store
    .subscription_status(id, Utc::now())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no subscription for user {id}"))
    })?;
  Ok(Json(eval))
}

/// `POST /users/:id/subscription` — returns 201 + the trial record.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subscription = store
    .start_trial(id, Utc::now())
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(subscription)))
}

/// `POST /users/:id/subscription/cancel`
pub async fn cancel<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subscription>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subscription = store
    .cancel_subscription(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subscription))
}

/// `POST /users/:id/subscription/reactivate`
pub async fn reactivate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subscription>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subscription = store
    .reactivate_subscription(id, Utc::now())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subscription))
}
