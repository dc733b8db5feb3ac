//! Error types for `moodlog-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::subscription::SubscriptionStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("email already registered: {0:?}")]
  EmailTaken(String),

  #[error("no entry for user {user_id} on {date}")]
  EntryNotFound { user_id: Uuid, date: NaiveDate },

  #[error("thought not found: {0}")]
  ThoughtNotFound(Uuid),

  #[error("no subscription for user: {0}")]
  SubscriptionNotFound(Uuid),

  #[error("user {0} already has a live subscription")]
  SubscriptionExists(Uuid),

  #[error("cannot move subscription from {from:?} to {to:?}")]
  InvalidTransition {
    from: SubscriptionStatus,
    to:   SubscriptionStatus,
  },

  #[error("a manual entry needs at least one mood")]
  EmptyMoods,

  #[error("unknown mood tag: {0:?}")]
  UnknownMood(String),

  #[error("malformed date key: {0:?}")]
  BadDateKey(String),

  #[error("unknown billing-processor status: {0:?}")]
  UnknownProcessorStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
