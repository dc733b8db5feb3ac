//! [`SqliteStore`] — the SQLite implementation of [`JournalStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use moodlog_core::{
  entry::{Entry, NewEntry},
  store::JournalStore,
  subscription::{EvaluatedSubscription, Subscription, SubscriptionStatus},
  thought::Thought,
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawEntry, RawSubscription, RawThought, RawUser, encode_date, encode_dt,
    encode_moods, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

const ENTRY_COLUMNS: &str =
  "user_id, date, moods, mood, mood_value, text, ai_response, recorded_at";

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
  Ok(RawEntry {
    user_id:     row.get(0)?,
    date:        row.get(1)?,
    moods:       row.get(2)?,
    mood:        row.get(3)?,
    mood_value:  row.get(4)?,
    text:        row.get(5)?,
    ai_response: row.get(6)?,
    recorded_at: row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A moodlog journal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read the stored subscription row for a user, without evaluation.
  async fn get_subscription_row(
    &self,
    user_id: Uuid,
  ) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, status, plan, price_cents, currency,
                      trial_start, trial_end, next_billing_date, created_at
               FROM subscriptions WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSubscription {
                  user_id:           row.get(0)?,
                  status:            row.get(1)?,
                  plan:              row.get(2)?,
                  price_cents:       row.get(3)?,
                  currency:          row.get(4)?,
                  trial_start:       row.get(5)?,
                  trial_end:         row.get(6)?,
                  next_billing_date: row.get(7)?,
                  created_at:        row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  /// Write a subscription record, replacing any existing row for the
  /// user. The single-row-per-user constraint makes `INSERT OR REPLACE`
  /// the natural persistence for every lifecycle mutation.
  async fn write_subscription(&self, sub: &Subscription) -> Result<()> {
    let user_id_str  = encode_uuid(sub.user_id);
    let status_str   = encode_status(sub.status).to_owned();
    let plan         = sub.plan.clone();
    let price_cents  = sub.price_cents;
    let currency     = sub.currency.clone();
    let trial_start  = sub.trial_start.map(encode_dt);
    let trial_end    = sub.trial_end.map(encode_dt);
    let next_billing = sub.next_billing_date.map(encode_dt);
    let created_at   = encode_dt(sub.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO subscriptions (
             user_id, status, plan, price_cents, currency,
             trial_start, trial_end, next_billing_date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            user_id_str,
            status_str,
            plan,
            price_cents,
            currency,
            trial_start,
            trial_end,
            next_billing,
            created_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── JournalStore impl ───────────────────────────────────────────────────────

impl JournalStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(
    &self,
    input: NewUser,
    now: DateTime<Utc>,
  ) -> Result<(User, Option<Subscription>)> {
    let email = input.normalized_email();
    if self.find_user_by_email(&email).await?.is_some() {
      return Err(moodlog_core::Error::EmailTaken(email).into());
    }

    let user = User {
      user_id: Uuid::new_v4(),
      email,
      name: input.name.clone(),
      created_at: now,
    };

    let id_str    = encode_uuid(user.user_id);
    let email_str = user.email.clone();
    let name      = user.name.clone();
    let at_str    = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    let subscription = if input.premium {
      Some(self.start_trial(user.user_id, now).await?)
    } else {
      None
    };

    Ok((user, subscription))
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, name, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  name:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email_norm = email.trim().to_ascii_lowercase();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, name, created_at FROM users WHERE email = ?1",
              rusqlite::params![email_norm],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  name:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, user_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(user_id);

    // Subscription, entries, and thoughts go with the row via
    // ON DELETE CASCADE.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(moodlog_core::Error::UserNotFound(user_id).into());
    }
    Ok(())
  }

  // ── Subscription lifecycle ────────────────────────────────────────────────

  async fn start_trial(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Subscription> {
    self
      .get_user(user_id)
      .await?
      .ok_or(moodlog_core::Error::UserNotFound(user_id))?;

    if let Some(existing) = self.get_subscription_row(user_id).await? {
      if existing.status != SubscriptionStatus::Cancelled {
        return Err(moodlog_core::Error::SubscriptionExists(user_id).into());
      }
      // A cancelled record is replaced wholesale by the fresh trial.
    }

    let sub = Subscription::start_trial(user_id, now);
    self.write_subscription(&sub).await?;
    Ok(sub)
  }

  async fn subscription_status(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Option<EvaluatedSubscription>> {
    let Some(sub) = self.get_subscription_row(user_id).await? else {
      return Ok(None);
    };

    let eval = sub.evaluate(now);

    if eval.transitioned {
      // Persist the lazily-detected transition. The computed state is
      // returned even if the write fails; this is a display-only side
      // effect and the next read will retry it.
      if let Err(error) = self.write_subscription(&eval.subscription).await {
        tracing::warn!(
          %user_id,
          %error,
          "failed to persist lazy subscription transition"
        );
      }
    }

    Ok(Some(eval))
  }

  async fn cancel_subscription(&self, user_id: Uuid) -> Result<Subscription> {
    let sub = self
      .get_subscription_row(user_id)
      .await?
      .ok_or(moodlog_core::Error::SubscriptionNotFound(user_id))?;

    let cancelled = sub.cancel()?;
    self.write_subscription(&cancelled).await?;
    Ok(cancelled)
  }

  async fn reactivate_subscription(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Subscription> {
    let sub = self
      .get_subscription_row(user_id)
      .await?
      .ok_or(moodlog_core::Error::SubscriptionNotFound(user_id))?;

    let reactivated = sub.reactivate(now)?;
    self.write_subscription(&reactivated).await?;
    Ok(reactivated)
  }

  async fn apply_external_status(
    &self,
    user_id: Uuid,
    status: SubscriptionStatus,
    next_billing_date: Option<DateTime<Utc>>,
  ) -> Result<Subscription> {
    let sub = self
      .get_subscription_row(user_id)
      .await?
      .ok_or(moodlog_core::Error::SubscriptionNotFound(user_id))?;

    let updated = sub.apply_external(status, next_billing_date);
    self.write_subscription(&updated).await?;
    Ok(updated)
  }

  // ── Entries ───────────────────────────────────────────────────────────────

  async fn upsert_entry(&self, user_id: Uuid, input: NewEntry) -> Result<Entry> {
    let moods = input.normalized_moods()?;

    let entry = Entry {
      user_id,
      date: input.date,
      moods,
      text: input.text,
      ai_response: input.ai_response,
      recorded_at: Utc::now(),
    };

    let user_id_str = encode_uuid(user_id);
    let date_str    = encode_date(entry.date);
    let moods_json  = encode_moods(&entry.moods)?;
    // First mood mirrored into the legacy columns for old readers.
    let mood_str    = entry.moods.first().map(|m| m.mood.as_str().to_owned());
    let mood_value  = entry.moods.first().and_then(|m| m.value).map(i64::from);
    let text        = entry.text.clone();
    let ai_response = entry.ai_response.clone();
    let at_str      = encode_dt(entry.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (user_id, date, moods, mood, mood_value, text, ai_response, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(user_id, date) DO UPDATE SET
             moods       = excluded.moods,
             mood        = excluded.mood,
             mood_value  = excluded.mood_value,
             text        = excluded.text,
             ai_response = excluded.ai_response,
             recorded_at = excluded.recorded_at",
          rusqlite::params![
            user_id_str,
            date_str,
            moods_json,
            mood_str,
            mood_value,
            text,
            ai_response,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn get_entry(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<Option<Entry>> {
    let user_id_str = encode_uuid(user_id);
    let date_str    = encode_date(date);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 AND date = ?2"
              ),
              rusqlite::params![user_id_str, date_str],
              entry_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn list_entries(&self, user_id: Uuid) -> Result<Vec<Entry>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 ORDER BY date DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], entry_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn entries_in_range(
    &self,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Entry>> {
    let user_id_str = encode_uuid(user_id);
    let start_str   = encode_date(start);
    let end_str     = encode_date(end);

    // Day keys sort lexicographically, so BETWEEN on the TEXT column is
    // an inclusive calendar range.
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ENTRY_COLUMNS} FROM entries
           WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
           ORDER BY date ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id_str, start_str, end_str],
            entry_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn attach_guidance(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    ai_response: String,
  ) -> Result<Entry> {
    let user_id_str = encode_uuid(user_id);
    let date_str    = encode_date(date);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE entries SET ai_response = ?3 WHERE user_id = ?1 AND date = ?2",
          rusqlite::params![user_id_str, date_str, ai_response],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(moodlog_core::Error::EntryNotFound { user_id, date }.into());
    }

    self
      .get_entry(user_id, date)
      .await?
      .ok_or_else(|| moodlog_core::Error::EntryNotFound { user_id, date }.into())
  }

  async fn delete_entry(&self, user_id: Uuid, date: NaiveDate) -> Result<()> {
    let user_id_str = encode_uuid(user_id);
    let date_str    = encode_date(date);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM entries WHERE user_id = ?1 AND date = ?2",
          rusqlite::params![user_id_str, date_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(moodlog_core::Error::EntryNotFound { user_id, date }.into());
    }
    Ok(())
  }

  // ── Thoughts ──────────────────────────────────────────────────────────────

  async fn add_thought(&self, user_id: Uuid, text: String) -> Result<Thought> {
    let thought = Thought {
      thought_id:  Uuid::new_v4(),
      user_id,
      text,
      ai_insights: None,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(thought.thought_id);
    let user_id_str = encode_uuid(user_id);
    let text        = thought.text.clone();
    let at_str      = encode_dt(thought.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO thoughts (thought_id, user_id, text, ai_insights, created_at)
           VALUES (?1, ?2, ?3, NULL, ?4)",
          rusqlite::params![id_str, user_id_str, text, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(thought)
  }

  async fn list_thoughts(&self, user_id: Uuid) -> Result<Vec<Thought>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawThought> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT thought_id, user_id, text, ai_insights, created_at
           FROM thoughts WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawThought {
              thought_id:  row.get(0)?,
              user_id:     row.get(1)?,
              text:        row.get(2)?,
              ai_insights: row.get(3)?,
              created_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawThought::into_thought).collect()
  }

  async fn attach_thought_insights(
    &self,
    user_id: Uuid,
    thought_id: Uuid,
    ai_insights: String,
  ) -> Result<Thought> {
    let id_str      = encode_uuid(thought_id);
    let user_id_str = encode_uuid(user_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE thoughts SET ai_insights = ?3 WHERE thought_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_id_str, ai_insights],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(moodlog_core::Error::ThoughtNotFound(thought_id).into());
    }

    let id_str = encode_uuid(thought_id);
    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT thought_id, user_id, text, ai_insights, created_at
               FROM thoughts WHERE thought_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawThought {
                  thought_id:  row.get(0)?,
                  user_id:     row.get(1)?,
                  text:        row.get(2)?,
                  ai_insights: row.get(3)?,
                  created_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawThought::into_thought)
      .transpose()?
      .ok_or_else(|| moodlog_core::Error::ThoughtNotFound(thought_id).into())
  }
}
