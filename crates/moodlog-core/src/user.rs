//! User — identity and billing anchor.
//!
//! A user owns zero-or-one subscription and unbounded entries and
//! thoughts. Deleting a user cascades to all of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  /// Stored lowercased; uniqueness is enforced on the normalized form.
  pub email:      String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to signup. `premium` opts the user into the trial subscription
/// in the same operation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub email:   String,
  pub name:    String,
  #[serde(default)]
  pub premium: bool,
}

impl NewUser {
  pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      email:   email.into(),
      name:    name.into(),
      premium: false,
    }
  }

  /// The case-normalized form the store keys uniqueness on.
  pub fn normalized_email(&self) -> String {
    self.email.trim().to_ascii_lowercase()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_is_lowercased_and_trimmed() {
    let input = NewUser::new("  Ada@Example.COM ", "Ada");
    assert_eq!(input.normalized_email(), "ada@example.com");
  }
}
