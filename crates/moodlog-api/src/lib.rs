//! JSON REST API for moodlog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`moodlog_core::store::JournalStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility: every route trusts the
//! `user_id` path segment to be a verified identity.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", moodlog_api::api_router(store.clone()))
//! ```

pub mod entries;
pub mod error;
pub mod subscriptions;
pub mod thoughts;
pub mod users;
pub mod webhooks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use moodlog_core::store::JournalStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: JournalStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>).delete(users::delete_one::<S>),
    )
    // Subscription lifecycle
    .route(
      "/users/{id}/subscription",
      get(subscriptions::status::<S>).post(subscriptions::create::<S>),
    )
    .route(
      "/users/{id}/subscription/cancel",
      post(subscriptions::cancel::<S>),
    )
    .route(
      "/users/{id}/subscription/reactivate",
      post(subscriptions::reactivate::<S>),
    )
    // Entries
    .route(
      "/users/{id}/entries",
      get(entries::list::<S>).post(entries::upsert::<S>),
    )
    .route(
      "/users/{id}/entries/{date}",
      get(entries::get_one::<S>).delete(entries::delete_one::<S>),
    )
    .route(
      "/users/{id}/entries/{date}/guidance",
      post(entries::attach_guidance::<S>),
    )
    // Thoughts
    .route(
      "/users/{id}/thoughts",
      get(thoughts::list::<S>).post(thoughts::create::<S>),
    )
    .route(
      "/users/{id}/thoughts/{thought_id}/insights",
      post(thoughts::attach_insights::<S>),
    )
    // Billing-processor webhook
    .route("/webhooks/billing", post(webhooks::billing::<S>))
    .with_state(store)
}
