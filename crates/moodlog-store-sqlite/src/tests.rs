//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use moodlog_core::{
  entry::{EntryOrigin, NewEntry},
  mood::{Mood, MoodScore},
  store::JournalStore,
  subscription::{SubscriptionStatus, one_month_after},
  user::NewUser,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn day(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn user(s: &SqliteStore) -> Uuid {
  let (user, _) = s
    .add_user(NewUser::new("ada@example.com", "Ada"), t0())
    .await
    .unwrap();
  user.user_id
}

async fn premium_user(s: &SqliteStore) -> Uuid {
  let mut input = NewUser::new("premium@example.com", "Premium");
  input.premium = true;
  let (user, sub) = s.add_user(input, t0()).await.unwrap();
  assert!(sub.is_some());
  user.user_id
}

fn happy_entry(date: NaiveDate) -> NewEntry {
  NewEntry::new(date, vec![MoodScore::with_value(Mood::Happy, 4)])
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let id = user(&s).await;

  let fetched = s.get_user(id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, id);
  assert_eq!(fetched.email, "ada@example.com");
  assert_eq!(fetched.name, "Ada");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
  let s = store().await;
  user(&s).await;

  let err = s
    .add_user(NewUser::new("ADA@Example.com", "Other Ada"), t0())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::EmailTaken(_))
  ));
}

#[tokio::test]
async fn find_user_by_email_normalizes() {
  let s = store().await;
  let id = user(&s).await;

  let found = s
    .find_user_by_email("  Ada@EXAMPLE.com ")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.user_id, id);
}

#[tokio::test]
async fn delete_user_cascades_to_owned_data() {
  let s = store().await;
  let id = premium_user(&s).await;
  s.upsert_entry(id, happy_entry(day("2024-03-01"))).await.unwrap();
  s.add_thought(id, "a thought".into()).await.unwrap();

  s.delete_user(id).await.unwrap();

  assert!(s.get_user(id).await.unwrap().is_none());
  assert!(s.subscription_status(id, t0()).await.unwrap().is_none());
  assert!(s.list_entries(id).await.unwrap().is_empty());
  assert!(s.list_thoughts(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_user_errors() {
  let s = store().await;
  let err = s.delete_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::UserNotFound(_))
  ));
}

// ─── Subscription lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn premium_signup_opens_trial() {
  let s = store().await;
  let id = premium_user(&s).await;

  let eval = s.subscription_status(id, t0()).await.unwrap().unwrap();
  assert_eq!(eval.subscription.status, SubscriptionStatus::Trial);
  assert_eq!(eval.subscription.trial_start, Some(t0()));
  assert_eq!(
    eval.subscription.trial_end,
    Some(t0() + TimeDelta::days(7))
  );
  // First billing lands at the end of the trial window.
  assert_eq!(
    eval.subscription.next_billing_date,
    eval.subscription.trial_end
  );
  assert_eq!(eval.days_remaining, Some(7));
}

#[tokio::test]
async fn free_signup_has_no_subscription() {
  let s = store().await;
  let id = user(&s).await;
  assert!(s.subscription_status(id, t0()).await.unwrap().is_none());
}

#[tokio::test]
async fn second_live_subscription_conflicts() {
  let s = store().await;
  let id = premium_user(&s).await;

  let err = s.start_trial(id, t0()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::SubscriptionExists(_))
  ));
}

#[tokio::test]
async fn cancelled_subscription_can_be_replaced_by_fresh_trial() {
  let s = store().await;
  let id = premium_user(&s).await;
  s.cancel_subscription(id).await.unwrap();

  let later = t0() + TimeDelta::days(90);
  let sub = s.start_trial(id, later).await.unwrap();
  assert_eq!(sub.status, SubscriptionStatus::Trial);
  assert_eq!(sub.trial_start, Some(later));
}

#[tokio::test]
async fn start_trial_for_unknown_user_errors() {
  let s = store().await;
  let err = s.start_trial(Uuid::new_v4(), t0()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::UserNotFound(_))
  ));
}

#[tokio::test]
async fn trial_day_before_expiry_reports_one_day() {
  let s = store().await;
  let id = premium_user(&s).await;
  let trial_end = t0() + TimeDelta::days(7);

  let eval = s
    .subscription_status(id, trial_end - TimeDelta::days(1))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(eval.subscription.status, SubscriptionStatus::Trial);
  assert_eq!(eval.days_remaining, Some(1));
}

#[tokio::test]
async fn expired_trial_flips_to_active_and_persists_once() {
  let s = store().await;
  let id = premium_user(&s).await;
  let trial_end = t0() + TimeDelta::days(7);
  let read_at = trial_end + TimeDelta::days(1);

  // First post-expiry read performs the transition.
  let first = s
    .subscription_status(id, read_at)
    .await
    .unwrap()
    .unwrap();
  assert!(first.transitioned);
  assert_eq!(first.subscription.status, SubscriptionStatus::Active);
  assert_eq!(first.days_remaining, None);
  assert_eq!(
    first.subscription.next_billing_date,
    Some(one_month_after(read_at))
  );

  // Subsequent reads see the persisted active record; no re-transition,
  // and the billing date computed at flip time stays put.
  let second = s
    .subscription_status(id, read_at + TimeDelta::days(3))
    .await
    .unwrap()
    .unwrap();
  assert!(!second.transitioned);
  assert_eq!(second.subscription.status, SubscriptionStatus::Active);
  assert_eq!(
    second.subscription.next_billing_date,
    Some(one_month_after(read_at))
  );
}

#[tokio::test]
async fn cancel_keeps_historical_trial_dates() {
  let s = store().await;
  let id = premium_user(&s).await;

  let cancelled = s.cancel_subscription(id).await.unwrap();
  assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
  assert_eq!(cancelled.trial_end, Some(t0() + TimeDelta::days(7)));

  // The persisted record matches what was returned.
  let eval = s.subscription_status(id, t0()).await.unwrap().unwrap();
  assert_eq!(eval.subscription.status, SubscriptionStatus::Cancelled);
  assert_eq!(eval.days_remaining, None);
}

#[tokio::test]
async fn cancel_twice_errors_and_leaves_record_alone() {
  let s = store().await;
  let id = premium_user(&s).await;
  s.cancel_subscription(id).await.unwrap();

  let err = s.cancel_subscription(id).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::InvalidTransition { .. })
  ));

  let eval = s.subscription_status(id, t0()).await.unwrap().unwrap();
  assert_eq!(eval.subscription.status, SubscriptionStatus::Cancelled);
}

#[tokio::test]
async fn cancel_without_subscription_errors() {
  let s = store().await;
  let id = user(&s).await;
  let err = s.cancel_subscription(id).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::SubscriptionNotFound(_))
  ));
}

#[tokio::test]
async fn reactivate_resumes_billing_one_month_out() {
  let s = store().await;
  let id = premium_user(&s).await;
  s.cancel_subscription(id).await.unwrap();

  let now = t0() + TimeDelta::days(20);
  let sub = s.reactivate_subscription(id, now).await.unwrap();
  assert_eq!(sub.status, SubscriptionStatus::Active);
  assert_eq!(sub.next_billing_date, Some(one_month_after(now)));
  // No second trial.
  assert_eq!(sub.trial_end, Some(t0() + TimeDelta::days(7)));
}

#[tokio::test]
async fn reactivate_live_subscription_errors() {
  let s = store().await;
  let id = premium_user(&s).await;
  let err = s.reactivate_subscription(id, t0()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::InvalidTransition { .. })
  ));
}

#[tokio::test]
async fn external_status_change_is_applied() {
  let s = store().await;
  let id = premium_user(&s).await;

  let billing = t0() + TimeDelta::days(37);
  let sub = s
    .apply_external_status(id, SubscriptionStatus::Active, Some(billing))
    .await
    .unwrap();
  assert_eq!(sub.status, SubscriptionStatus::Active);
  assert_eq!(sub.next_billing_date, Some(billing));

  // A deletion event carries no billing date; the stored one is kept.
  let sub = s
    .apply_external_status(id, SubscriptionStatus::Cancelled, None)
    .await
    .unwrap();
  assert_eq!(sub.status, SubscriptionStatus::Cancelled);
  assert_eq!(sub.next_billing_date, Some(billing));
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_entry() {
  let s = store().await;
  let id = user(&s).await;

  let mut input = happy_entry(day("2024-03-01"));
  input.text = Some("a good day".into());
  let stored = s.upsert_entry(id, input).await.unwrap();
  assert_eq!(stored.moods, vec![MoodScore::with_value(Mood::Happy, 4)]);

  let fetched = s.get_entry(id, day("2024-03-01")).await.unwrap().unwrap();
  assert_eq!(fetched, stored);
}

#[tokio::test]
async fn upsert_same_key_is_idempotent_last_write_wins() {
  let s = store().await;
  let id = user(&s).await;
  let date = day("2024-03-01");

  s.upsert_entry(id, happy_entry(date)).await.unwrap();

  let mut second = NewEntry::new(date, vec![MoodScore::with_value(Mood::Sad, 2)]);
  second.text = Some("turned sour".into());
  s.upsert_entry(id, second).await.unwrap();

  // Exactly one record for the key, holding the second call's values.
  let all = s.list_entries(id).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].moods, vec![MoodScore::with_value(Mood::Sad, 2)]);
  assert_eq!(all[0].text.as_deref(), Some("turned sour"));
}

#[tokio::test]
async fn upsert_overwrite_is_destructive() {
  let s = store().await;
  let id = user(&s).await;
  let date = day("2024-03-01");

  s.upsert_entry(id, happy_entry(date)).await.unwrap();
  s.attach_guidance(id, date, "take a walk".into()).await.unwrap();

  // A plain re-save replaces every field, including the guidance a
  // caller did not carry over.
  s.upsert_entry(id, happy_entry(date)).await.unwrap();
  let fetched = s.get_entry(id, date).await.unwrap().unwrap();
  assert_eq!(fetched.ai_response, None);
}

#[tokio::test]
async fn manual_save_without_moods_is_rejected() {
  let s = store().await;
  let id = user(&s).await;

  let err = s
    .upsert_entry(id, NewEntry::new(day("2024-03-01"), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::EmptyMoods)
  ));
  assert!(s.get_entry(id, day("2024-03-01")).await.unwrap().is_none());
}

#[tokio::test]
async fn voice_save_defaults_to_neutral_placeholder() {
  let s = store().await;
  let id = user(&s).await;

  let mut input = NewEntry::new(day("2024-03-01"), vec![]);
  input.origin = EntryOrigin::Voice;
  let stored = s.upsert_entry(id, input).await.unwrap();
  assert_eq!(stored.moods, vec![MoodScore::new(Mood::Neutral)]);
}

#[tokio::test]
async fn legacy_single_mood_row_reads_as_one_element_sequence() {
  let s = store().await;
  let id = user(&s).await;

  // A row written by the old single-mood format: no moods JSON at all.
  let id_str = id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO entries (user_id, date, moods, mood, mood_value, text, ai_response, recorded_at)
         VALUES (?1, '2024-02-10', NULL, 'grateful', 3, 'old row', NULL, '2024-02-10T08:00:00+00:00')",
        rusqlite::params![id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let entry = s.get_entry(id, day("2024-02-10")).await.unwrap().unwrap();
  assert_eq!(entry.moods, vec![MoodScore::with_value(Mood::Grateful, 3)]);
  assert_eq!(entry.text.as_deref(), Some("old row"));
}

#[tokio::test]
async fn legacy_row_with_unknown_tag_is_a_validation_error() {
  let s = store().await;
  let id = user(&s).await;

  let id_str = id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO entries (user_id, date, mood, recorded_at)
         VALUES (?1, '2024-02-10', 'ecstatic', '2024-02-10T08:00:00+00:00')",
        rusqlite::params![id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.get_entry(id, day("2024-02-10")).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::UnknownMood(_))
  ));
}

#[tokio::test]
async fn range_query_is_inclusive_and_ascending() {
  let s = store().await;
  let id = user(&s).await;

  for d in ["2024-03-08", "2024-03-03", "2024-03-01"] {
    s.upsert_entry(id, happy_entry(day(d))).await.unwrap();
  }

  let hits = s
    .entries_in_range(id, day("2024-03-01"), day("2024-03-07"))
    .await
    .unwrap();
  let dates: Vec<_> = hits.iter().map(|e| e.date).collect();
  assert_eq!(dates, vec![day("2024-03-01"), day("2024-03-03")]);
}

#[tokio::test]
async fn range_query_with_no_matches_is_empty_not_an_error() {
  let s = store().await;
  let id = user(&s).await;

  let hits = s
    .entries_in_range(id, day("2024-03-01"), day("2024-03-07"))
    .await
    .unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn list_entries_is_newest_first() {
  let s = store().await;
  let id = user(&s).await;

  for d in ["2024-03-01", "2024-03-05", "2024-03-03"] {
    s.upsert_entry(id, happy_entry(day(d))).await.unwrap();
  }

  let dates: Vec<_> = s
    .list_entries(id)
    .await
    .unwrap()
    .iter()
    .map(|e| e.date)
    .collect();
  assert_eq!(
    dates,
    vec![day("2024-03-05"), day("2024-03-03"), day("2024-03-01")]
  );
}

#[tokio::test]
async fn entries_are_scoped_per_user() {
  let s = store().await;
  let a = user(&s).await;
  let (b, _) = s
    .add_user(NewUser::new("grace@example.com", "Grace"), t0())
    .await
    .unwrap();

  s.upsert_entry(a, happy_entry(day("2024-03-01"))).await.unwrap();

  assert!(s.get_entry(b.user_id, day("2024-03-01")).await.unwrap().is_none());
  assert!(s.list_entries(b.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn attach_guidance_touches_only_ai_response() {
  let s = store().await;
  let id = user(&s).await;
  let date = day("2024-03-01");

  let mut input = happy_entry(date);
  input.text = Some("kept".into());
  s.upsert_entry(id, input).await.unwrap();

  let updated = s
    .attach_guidance(id, date, "breathe deeply".into())
    .await
    .unwrap();
  assert_eq!(updated.ai_response.as_deref(), Some("breathe deeply"));
  assert_eq!(updated.text.as_deref(), Some("kept"));
  assert_eq!(updated.moods, vec![MoodScore::with_value(Mood::Happy, 4)]);
}

#[tokio::test]
async fn attach_guidance_without_entry_errors() {
  let s = store().await;
  let id = user(&s).await;

  let err = s
    .attach_guidance(id, day("2024-03-01"), "ghost".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::EntryNotFound { .. })
  ));
}

#[tokio::test]
async fn delete_entry_then_delete_again_errors() {
  let s = store().await;
  let id = user(&s).await;
  let date = day("2024-03-01");

  s.upsert_entry(id, happy_entry(date)).await.unwrap();
  s.delete_entry(id, date).await.unwrap();
  assert!(s.get_entry(id, date).await.unwrap().is_none());

  let err = s.delete_entry(id, date).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::EntryNotFound { .. })
  ));
}

// ─── Thoughts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn thoughts_append_without_uniqueness() {
  let s = store().await;
  let id = user(&s).await;

  s.add_thought(id, "first".into()).await.unwrap();
  s.add_thought(id, "first".into()).await.unwrap();

  // Same text twice is fine; thoughts are not keyed like entries.
  assert_eq!(s.list_thoughts(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn attach_thought_insights() {
  let s = store().await;
  let id = user(&s).await;

  let thought = s.add_thought(id, "why so tired".into()).await.unwrap();
  let updated = s
    .attach_thought_insights(id, thought.thought_id, "rest matters".into())
    .await
    .unwrap();
  assert_eq!(updated.ai_insights.as_deref(), Some("rest matters"));
  assert_eq!(updated.text, "why so tired");
}

#[tokio::test]
async fn thought_insights_are_scoped_per_user() {
  let s = store().await;
  let a = user(&s).await;
  let (b, _) = s
    .add_user(NewUser::new("grace@example.com", "Grace"), t0())
    .await
    .unwrap();

  let thought = s.add_thought(a, "mine".into()).await.unwrap();
  let err = s
    .attach_thought_insights(b.user_id, thought.thought_id, "theirs".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Domain(moodlog_core::Error::ThoughtNotFound(_))
  ));
}
