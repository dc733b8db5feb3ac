//! HTTP server assembly for moodlog.
//!
//! Wraps the [`moodlog_api`] router with request tracing and an optional
//! whole-API HTTP Basic auth guard. Per-user identity stays in the URL
//! path; the guard (when configured) is a deployment-level shared secret
//! in front of the whole service.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use moodlog_core::store::JournalStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `MOODLOG_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Set together with `auth_password_hash` to require Basic auth on
  /// every request. Leave both unset to run open (e.g. behind a gateway
  /// that authenticates for us).
  pub auth_username:      Option<String>,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub auth_password_hash: Option<String>,
}

impl ServerConfig {
  /// The Basic-auth credentials, if both halves are configured.
  ///
  /// Errors if exactly one half is set — a half-configured guard is a
  /// deployment mistake, not a request to run open.
  pub fn auth_config(&self) -> Result<Option<AuthConfig>, Error> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(password_hash)) => Ok(Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      })),
      (None, None) => Ok(None),
      _ => Err(Error::PartialAuthConfig),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state assembled at startup.
#[derive(Clone)]
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Option<Arc<AuthConfig>>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`]: the JSON API nested under
/// `/api`, traced, and guarded when auth is configured.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: JournalStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut app =
    Router::new().nest("/api", moodlog_api::api_router(state.store.clone()));

  if let Some(auth) = state.auth.clone() {
    app = app.layer(middleware::from_fn_with_state(auth, auth::require_auth));
  }

  app.layer(TraceLayer::new_for_http())
}
