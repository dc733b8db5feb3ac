//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; day keys as `YYYY-MM-DD`
//! (which makes range comparisons on the TEXT column correct). The moods
//! sequence is compact JSON. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use moodlog_core::{
  entry::{Entry, parse_date_key},
  mood::{Mood, MoodScore},
  subscription::{Subscription, SubscriptionStatus},
  thought::Thought,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Day keys ─────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date_key(s)?) }

// ─── SubscriptionStatus ───────────────────────────────────────────────────────

pub fn encode_status(s: SubscriptionStatus) -> &'static str {
  match s {
    SubscriptionStatus::Inactive => "inactive",
    SubscriptionStatus::Trial => "trial",
    SubscriptionStatus::Active => "active",
    SubscriptionStatus::Cancelled => "cancelled",
  }
}

pub fn decode_status(s: &str) -> Result<SubscriptionStatus> {
  match s {
    "inactive" => Ok(SubscriptionStatus::Inactive),
    "trial" => Ok(SubscriptionStatus::Trial),
    "active" => Ok(SubscriptionStatus::Active),
    "cancelled" => Ok(SubscriptionStatus::Cancelled),
    other => Err(Error::DateParse(format!("unknown status: {other:?}"))),
  }
}

// ─── Moods ────────────────────────────────────────────────────────────────────

pub fn encode_moods(moods: &[MoodScore]) -> Result<String> {
  Ok(serde_json::to_string(moods)?)
}

pub fn decode_moods(s: &str) -> Result<Vec<MoodScore>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub user_id:           String,
  pub status:            String,
  pub plan:              String,
  pub price_cents:       u32,
  pub currency:          String,
  pub trial_start:       Option<String>,
  pub trial_end:         Option<String>,
  pub next_billing_date: Option<String>,
  pub created_at:        String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      user_id:           decode_uuid(&self.user_id)?,
      status:            decode_status(&self.status)?,
      plan:              self.plan,
      price_cents:       self.price_cents,
      currency:          self.currency,
      trial_start:       self
        .trial_start
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      trial_end:         self.trial_end.as_deref().map(decode_dt).transpose()?,
      next_billing_date: self
        .next_billing_date
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `entries` row.
///
/// This adapter is where the legacy single-mood shape is normalized: a
/// row with no `moods` JSON but a populated `mood` column becomes a
/// one-element sequence. Nothing above this point branches on shape.
pub struct RawEntry {
  pub user_id:     String,
  pub date:        String,
  pub moods:       Option<String>,
  pub mood:        Option<String>,
  pub mood_value:  Option<i64>,
  pub text:        Option<String>,
  pub ai_response: Option<String>,
  pub recorded_at: String,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<Entry> {
    let moods = match self.moods.as_deref() {
      Some(json) if !json.is_empty() => decode_moods(json)?,
      _ => match self.mood.as_deref() {
        Some(tag) => vec![MoodScore {
          mood:  Mood::parse(tag)?,
          value: self.mood_value.map(|v| v as u8),
        }],
        None => Vec::new(),
      },
    };

    Ok(Entry {
      user_id: decode_uuid(&self.user_id)?,
      date: decode_date(&self.date)?,
      moods,
      text: self.text,
      ai_response: self.ai_response,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `thoughts` row.
pub struct RawThought {
  pub thought_id:  String,
  pub user_id:     String,
  pub text:        String,
  pub ai_insights: Option<String>,
  pub created_at:  String,
}

impl RawThought {
  pub fn into_thought(self) -> Result<Thought> {
    Ok(Thought {
      thought_id:  decode_uuid(&self.thought_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      text:        self.text,
      ai_insights: self.ai_insights,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
