//! Handler for `POST /webhooks/billing`.
//!
//! The billing processor independently advances real subscription state;
//! this endpoint is the single advisory-sync entrypoint its webhook
//! dispatcher calls after verifying the event signature (verification is
//! the dispatcher's job, not ours). Only status mapping happens here:
//! processor strings are translated onto the local taxonomy and unknown
//! ones rejected.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use moodlog_core::{
  store::JournalStore,
  subscription::{Subscription, SubscriptionStatus},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body posted by the webhook dispatcher.
#[derive(Debug, Deserialize)]
pub struct BillingEventBody {
  pub user_id:           Uuid,
  /// Processor status string, e.g. `"trialing"`, `"active"`,
  /// `"canceled"`.
  pub status:            String,
  /// End of the current paid period, when the event carries one.
  pub next_billing_date: Option<DateTime<Utc>>,
}

/// `POST /webhooks/billing`
pub async fn billing<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<BillingEventBody>,
) -> Result<Json<Subscription>, ApiError>
where
  S: JournalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let status = SubscriptionStatus::from_processor(&body.status)
    .map_err(ApiError::from_store)?;

  let subscription = store
    .apply_external_status(body.user_id, status, body.next_billing_date)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subscription))
}
