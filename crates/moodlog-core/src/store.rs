//! The `JournalStore` trait — the persistence seam of the service.
//!
//! The trait is implemented by storage backends (e.g.
//! `moodlog-store-sqlite`). Higher layers (`moodlog-api`,
//! `moodlog-server`) depend on this abstraction, not on any concrete
//! backend.
//!
//! Time-dependent lifecycle operations take `now` explicitly so their
//! behavior is deterministic under test; plain record timestamps
//! (`recorded_at`, `created_at` on thoughts) are assigned by the backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  entry::{Entry, NewEntry},
  subscription::{EvaluatedSubscription, Subscription, SubscriptionStatus},
  thought::Thought,
  user::{NewUser, User},
};

/// Abstraction over a moodlog storage backend.
///
/// Uniqueness is the backend's job: one user per email, one subscription
/// per user, one entry per `(user, date)`. Concurrent saves to the same
/// entry key resolve last-write-wins through the backend's atomic upsert.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait JournalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user; when `input.premium` is set, open their trial
  /// subscription in the same operation.
  ///
  /// Fails if the normalized email is already registered.
  fn add_user(
    &self,
    input: NewUser,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(User, Option<Subscription>), Self::Error>>
  + Send
  + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by email (normalized before matching).
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Delete a user and everything they own — subscription, entries,
  /// thoughts. Fails if the user does not exist.
  fn delete_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subscription lifecycle ────────────────────────────────────────────

  /// Open a 7-day trial for the user.
  ///
  /// Fails if a non-cancelled subscription already exists; a cancelled
  /// record is replaced with the fresh trial.
  fn start_trial(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Read the subscription with its status re-derived as of `now`.
  ///
  /// If the evaluation flipped the record (trial expiry), the backend
  /// persists the change before returning; a failed persist is logged and
  /// the computed result is still returned. Returns `None` if the user
  /// has no subscription record.
  fn subscription_status(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<EvaluatedSubscription>, Self::Error>>
  + Send
  + '_;

  /// Cancel the user's subscription. Fails if there is none or it is
  /// already cancelled.
  fn cancel_subscription(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Reactivate a cancelled subscription; billing resumes one month from
  /// `now`. Fails unless the current status is cancelled.
  fn reactivate_subscription(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Advisory status sync invoked by the billing-processor webhook
  /// handler. Fails if the user has no subscription record.
  fn apply_external_status(
    &self,
    user_id: Uuid,
    status: SubscriptionStatus,
    next_billing_date: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  // ── Entries ───────────────────────────────────────────────────────────

  /// Insert-or-overwrite the entry for `(user_id, input.date)`. The
  /// stored record (with its server-assigned timestamp) is returned.
  fn upsert_entry(
    &self,
    user_id: Uuid,
    input: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Retrieve one entry by day key. Returns `None` if absent.
  fn get_entry(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// All entries for a user, newest date first.
  fn list_entries(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Entries with `start <= date <= end`, ascending. Both endpoints are
  /// inclusive; an empty result is not an error.
  fn entries_in_range(
    &self,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Attach AI guidance to an existing entry without touching its other
  /// fields — the second phase of a save-then-generate workflow. Fails if
  /// no entry exists for the date.
  fn attach_guidance(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    ai_response: String,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Hard-delete one entry. Fails if absent — repeated deletes after the
  /// first report the missing row rather than silently succeeding.
  fn delete_entry(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Thoughts ──────────────────────────────────────────────────────────

  /// Append a thought.
  fn add_thought(
    &self,
    user_id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<Thought, Self::Error>> + Send + '_;

  /// All thoughts for a user, newest first.
  fn list_thoughts(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Thought>, Self::Error>> + Send + '_;

  /// Attach AI insights to an existing thought. Fails if the thought does
  /// not exist (or belongs to another user).
  fn attach_thought_insights(
    &self,
    user_id: Uuid,
    thought_id: Uuid,
    ai_insights: String,
  ) -> impl Future<Output = Result<Thought, Self::Error>> + Send + '_;
}
