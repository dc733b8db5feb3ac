//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Backend errors are classified by walking their source chain for a
//! [`moodlog_core::Error`], so the domain taxonomy (not-found, invalid
//! transition, validation, conflict) reaches HTTP callers with the right
//! status code no matter which backend produced it. Anything
//! unrecognized stays a 500.

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

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error, mapping any typed domain failure in its
  /// source chain onto the HTTP taxonomy.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    if let Some(mapped) = classify(&err) {
      return mapped;
    }
    ApiError::Store(Box::new(err))
  }
}

fn classify(err: &(dyn std::error::Error + 'static)) -> Option<ApiError> {
  use moodlog_core::Error as Domain;

  let mut current = Some(err);
  while let Some(e) = current {
    if let Some(domain) = e.downcast_ref::<Domain>() {
      let message = domain.to_string();
      return match domain {
        Domain::UserNotFound(_)
        | Domain::EntryNotFound { .. }
        | Domain::ThoughtNotFound(_)
        | Domain::SubscriptionNotFound(_) => Some(ApiError::NotFound(message)),

        Domain::EmailTaken(_) | Domain::SubscriptionExists(_) => {
          Some(ApiError::Conflict(message))
        }

        Domain::InvalidTransition { .. }
        | Domain::EmptyMoods
        | Domain::UnknownMood(_)
        | Domain::BadDateKey(_)
        | Domain::UnknownProcessorStatus(_) => {
          Some(ApiError::BadRequest(message))
        }

        Domain::Serialization(_) => None,
      };
    }
    current = e.source();
  }
  None
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum FakeStoreError {
    #[error("domain error: {0}")]
    Domain(#[from] moodlog_core::Error),

    #[error("io error")]
    Io,
  }

  #[test]
  fn domain_error_in_chain_is_classified() {
    let err = FakeStoreError::Domain(moodlog_core::Error::EmptyMoods);
    assert!(matches!(
      ApiError::from_store(err),
      ApiError::BadRequest(_)
    ));

    let err = FakeStoreError::Domain(moodlog_core::Error::SubscriptionExists(
      uuid::Uuid::nil(),
    ));
    assert!(matches!(ApiError::from_store(err), ApiError::Conflict(_)));

    let err = FakeStoreError::Domain(moodlog_core::Error::UserNotFound(
      uuid::Uuid::nil(),
    ));
    assert!(matches!(ApiError::from_store(err), ApiError::NotFound(_)));
  }

  #[test]
  fn unrecognized_error_stays_internal() {
    assert!(matches!(
      ApiError::from_store(FakeStoreError::Io),
      ApiError::Store(_)
    ));
  }

  #[test]
  fn bare_domain_error_is_classified_too() {
    let err = moodlog_core::Error::UnknownMood("ecstatic".into());
    assert!(matches!(
      ApiError::from_store(err),
      ApiError::BadRequest(_)
    ));
  }
}
