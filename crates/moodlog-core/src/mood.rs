//! The mood vocabulary — a closed set of tags with display labels.
//!
//! The store validates every user-entered tag against this set; unknown
//! tags are rejected at the boundary rather than stored as free text.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A mood tag. The serde tag doubles as the value stored in the database
/// and accepted over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
  Excited,
  Happy,
  Grateful,
  Calm,
  Content,
  Neutral,
  Tired,
  Stressed,
  Frustrated,
  Sad,
  Unhappy,
  Anxious,
  Depressed,
  Lost,
}

impl Mood {
  /// Every tag, in display order.
  pub const ALL: [Mood; 14] = [
    Mood::Excited,
    Mood::Happy,
    Mood::Grateful,
    Mood::Calm,
    Mood::Content,
    Mood::Neutral,
    Mood::Tired,
    Mood::Stressed,
    Mood::Frustrated,
    Mood::Sad,
    Mood::Unhappy,
    Mood::Anxious,
    Mood::Depressed,
    Mood::Lost,
  ];

  /// The tag string stored in the `mood` column and used on the wire.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Mood::Excited => "excited",
      Mood::Happy => "happy",
      Mood::Grateful => "grateful",
      Mood::Calm => "calm",
      Mood::Content => "content",
      Mood::Neutral => "neutral",
      Mood::Tired => "tired",
      Mood::Stressed => "stressed",
      Mood::Frustrated => "frustrated",
      Mood::Sad => "sad",
      Mood::Unhappy => "unhappy",
      Mood::Anxious => "anxious",
      Mood::Depressed => "depressed",
      Mood::Lost => "lost",
    }
  }

  /// Human-readable label for UI display.
  pub fn label(&self) -> &'static str {
    match self {
      Mood::Excited => "Excited",
      Mood::Happy => "Happy",
      Mood::Grateful => "Grateful",
      Mood::Calm => "Calm",
      Mood::Content => "Content",
      Mood::Neutral => "Neutral",
      Mood::Tired => "Tired",
      Mood::Stressed => "Stressed",
      Mood::Frustrated => "Frustrated",
      Mood::Sad => "Sad",
      Mood::Unhappy => "Unhappy",
      Mood::Anxious => "Anxious",
      Mood::Depressed => "Depressed",
      Mood::Lost => "Lost",
    }
  }

  /// Parse a stored or user-entered tag. Anything outside the closed set
  /// is a validation error, never stored.
  pub fn parse(tag: &str) -> Result<Self> {
    Mood::ALL
      .into_iter()
      .find(|m| m.as_str() == tag)
      .ok_or_else(|| Error::UnknownMood(tag.to_owned()))
  }
}

/// One selected mood with its self-reported intensity.
///
/// `value` is absent on rows written by the legacy single-mood format,
/// which recorded only the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodScore {
  pub mood:  Mood,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value: Option<u8>,
}

impl MoodScore {
  pub fn new(mood: Mood) -> Self { Self { mood, value: None } }

  pub fn with_value(mood: Mood, value: u8) -> Self {
    Self { mood, value: Some(value) }
  }
}
