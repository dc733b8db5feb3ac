//! Entry types — one journal record per user per calendar day.
//!
//! Entries are keyed on `(user_id, date)`; a second save on the same key
//! overwrites the first. The multi-mood sequence is canonical; legacy rows
//! holding a single mood/value pair are normalized into a one-element
//! sequence by the store's read adapter, so nothing above the store ever
//! branches on shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  mood::{Mood, MoodScore},
};

// ─── Origin ──────────────────────────────────────────────────────────────────

/// How a save reached the store. Manual saves must carry at least one
/// mood; voice-derived saves may arrive without one and are given a
/// neutral placeholder.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
  #[default]
  Manual,
  Voice,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A stored journal entry. `recorded_at` is server-assigned and refreshed
/// on every overwrite of the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub user_id:     Uuid,
  pub date:        NaiveDate,
  /// At least one element for any entry written through [`NewEntry`].
  pub moods:       Vec<MoodScore>,
  pub text:        Option<String>,
  /// Attached asynchronously after the entry itself is saved.
  pub ai_response: Option<String>,
  pub recorded_at: DateTime<Utc>,
}

// ─── NewEntry ────────────────────────────────────────────────────────────────

/// Input to an entry upsert. The save fully replaces `moods`, `text`, and
/// `ai_response` for the key; callers preserving a previously attached
/// guidance text must read-modify-write.
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub date:        NaiveDate,
  pub moods:       Vec<MoodScore>,
  pub text:        Option<String>,
  pub ai_response: Option<String>,
  pub origin:      EntryOrigin,
}

impl NewEntry {
  /// Convenience constructor for a manual save.
  pub fn new(date: NaiveDate, moods: Vec<MoodScore>) -> Self {
    Self {
      date,
      moods,
      text: None,
      ai_response: None,
      origin: EntryOrigin::Manual,
    }
  }

  /// The mood sequence to store, after origin-dependent validation.
  ///
  /// Manual saves with no moods are rejected; voice-derived saves fall
  /// back to a single neutral placeholder (documented behavior, not an
  /// error).
  pub fn normalized_moods(&self) -> Result<Vec<MoodScore>> {
    if !self.moods.is_empty() {
      return Ok(self.moods.clone());
    }
    match self.origin {
      EntryOrigin::Voice => Ok(vec![MoodScore::new(Mood::Neutral)]),
      EntryOrigin::Manual => Err(Error::EmptyMoods),
    }
  }
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_date_key(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| Error::BadDateKey(s.to_owned()))
}
