//! Thought — a standalone reflection, independent of the daily entry.
//!
//! Thoughts are append-only and carry no uniqueness constraint; a user
//! may record any number per day. AI insights are attached after the
//! fact, the same two-phase shape as entry guidance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
  pub thought_id:  Uuid,
  pub user_id:     Uuid,
  pub text:        String,
  pub ai_insights: Option<String>,
  pub created_at:  DateTime<Utc>,
}
