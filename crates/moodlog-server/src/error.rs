//! Error types and axum `IntoResponse` implementation for the server
//! layer.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("auth_username and auth_password_hash must be set together")]
  PartialAuthConfig,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"moodlog\""),
        );
        res
      }
      Error::PartialAuthConfig => {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
      }
    }
  }
}
