//! Handlers for `/users/:id/entries` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users/:id/entries` | Newest first; `?start=&end=` gives an inclusive ascending range |
//! | `POST`   | `/users/:id/entries` | Body: [`NewEntryBody`]; upsert keyed on the date |
//! | `GET`    | `/users/:id/entries/:date` | Single entry |
//! | `DELETE` | `/users/:id/entries/:date` | 404 if absent |
//! | `POST`   | `/users/:id/entries/:date/guidance` | Body: `{"text":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use moodlog_core::{
  entry::{Entry, EntryOrigin, NewEntry},
  mood::MoodScore,
  store::JournalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List / range ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Range start (inclusive). Must be given together with `end`.
  pub start: Option<NaiveDate>,
  /// Range end (inclusive).
  pub end:   Option<NaiveDate>,
}

/// `GET /users/:id/entries[?start=YYYY-MM-DD&end=YYYY-MM-DD]`
///
/// Without a range: all entries, newest first. With one: entries inside
/// the inclusive window, ascending — the shape the weekly and monthly
/// reports aggregate over.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = match (params.start, params.end) {
    (Some(start), Some(end)) => store
      .entries_in_range(id, start, end)
      .await
      .map_err(ApiError::from_store)?,
    (None, None) => store
      .list_entries(id)
      .await
      .map_err(ApiError::from_store)?,
    _ => {
      return Err(ApiError::BadRequest(
        "start and end must be given together".to_owned(),
      ));
    }
  };
  Ok(Json(entries))
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users/:id/entries`.
#[derive(Debug, Deserialize)]
pub struct NewEntryBody {
  pub date:        NaiveDate,
  #[serde(default)]
  pub moods:       Vec<MoodScore>,
  pub text:        Option<String>,
  pub ai_response: Option<String>,
  #[serde(default)]
  pub origin:      EntryOrigin,
}

impl From<NewEntryBody> for NewEntry {
  fn from(b: NewEntryBody) -> Self {
    NewEntry {
      date:        b.date,
      moods:       b.moods,
      text:        b.text,
      ai_response: b.ai_response,
      origin:      b.origin,
    }
  }
}

/// `POST /users/:id/entries` — returns 201 + the stored entry. Saving the
/// same date twice overwrites; there is never more than one record per
/// day.
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewEntryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .upsert_entry(id, NewEntry::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id/entries/:date`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Entry>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .get_entry(id, date)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no entry on {date}")))?;
  Ok(Json(entry))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:id/entries/:date` — hard delete; repeating it 404s.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path((id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .delete_entry(id, date)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Guidance ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GuidanceBody {
  pub text: String,
}

/// `POST /users/:id/entries/:date/guidance` — second phase of the
/// save-then-generate workflow; only `ai_response` changes.
pub async fn attach_guidance<S>(
  State(store): State<Arc<S>>,
  Path((id, date)): Path<(Uuid, NaiveDate)>,
  Json(body): Json<GuidanceBody>,
) -> Result<Json<Entry>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .attach_guidance(id, date, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entry))
}
