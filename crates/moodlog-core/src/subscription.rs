//! Subscription lifecycle — status transitions and trial arithmetic.
//!
//! Status is re-derived lazily every time a record is read: there is no
//! background job watching for trial expiry. All functions here take `now`
//! as an explicit parameter and perform no I/O; the store persists any
//! record that an evaluation mutated.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Length of the free trial window.
pub const TRIAL_DAYS: i64 = 7;

/// Static descriptors of the single premium tier.
pub const PREMIUM_PLAN: &str = "premium";
pub const PREMIUM_PRICE_CENTS: u32 = 500;
pub const PREMIUM_CURRENCY: &str = "USD";

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Billing state of a subscription.
///
/// Legal transitions: `Inactive → Trial` (opt-in), `Trial → Active` (lazy
/// expiry detection), `Trial | Active → Cancelled` (explicit), and
/// `Cancelled → Active` (explicit reactivation, no second trial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  Inactive,
  Trial,
  Active,
  Cancelled,
}

impl SubscriptionStatus {
  /// Map a billing-processor status string onto the local taxonomy.
  ///
  /// The processor reports `"trialing"` where we say `trial`; both common
  /// spellings of `cancelled` are accepted. Anything else (e.g.
  /// `"past_due"`) has no local representation and is rejected.
  pub fn from_processor(status: &str) -> Result<Self> {
    match status {
      "trialing" | "trial" => Ok(Self::Trial),
      "active" => Ok(Self::Active),
      "canceled" | "cancelled" => Ok(Self::Cancelled),
      "inactive" => Ok(Self::Inactive),
      other => Err(Error::UnknownProcessorStatus(other.to_owned())),
    }
  }

  pub fn is_live(&self) -> bool {
    matches!(self, Self::Trial | Self::Active)
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// Billing state for one user. At most one record exists per user.
///
/// Invariants: `trial_end` implies `trial_start`, with `trial_start <
/// trial_end`; `next_billing_date` is present iff status is trial or
/// active. A record violating these is stale and is normalized on the
/// next read by [`Subscription::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
  pub user_id:           Uuid,
  pub status:            SubscriptionStatus,
  pub plan:              String,
  pub price_cents:       u32,
  pub currency:          String,
  pub trial_start:       Option<DateTime<Utc>>,
  pub trial_end:         Option<DateTime<Utc>>,
  pub next_billing_date: Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
}

/// A subscription bundled with its read-time evaluation — the analogue of
/// a status computed at query time rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedSubscription {
  pub subscription:   Subscription,
  /// Days left in the trial window; present iff the evaluated status is
  /// [`SubscriptionStatus::Trial`]. Never negative; 0 on the expiry day
  /// itself while the trial is still technically running.
  pub days_remaining: Option<u32>,
  /// True when this evaluation changed the record (trial expiry flip).
  /// The caller must persist the returned record before surfacing it.
  pub transitioned:   bool,
}

impl Subscription {
  /// Open a fresh premium trial: 7-day window starting at `now`, with the
  /// first billing date at the end of the window.
  pub fn start_trial(user_id: Uuid, now: DateTime<Utc>) -> Self {
    let trial_end = now + TimeDelta::days(TRIAL_DAYS);
    Self {
      user_id,
      status: SubscriptionStatus::Trial,
      plan: PREMIUM_PLAN.to_owned(),
      price_cents: PREMIUM_PRICE_CENTS,
      currency: PREMIUM_CURRENCY.to_owned(),
      trial_start: Some(now),
      trial_end: Some(trial_end),
      next_billing_date: Some(trial_end),
      created_at: now,
    }
  }

  /// Re-derive status as of `now`.
  ///
  /// A trial whose window has passed (strictly after `trial_end`) flips to
  /// active with billing one month out. Day counts use ceiling division on
  /// the millisecond difference, clamped to zero: a user checking at the
  /// exact expiry instant sees 0 days remaining but is not yet expired.
  pub fn evaluate(self, now: DateTime<Utc>) -> EvaluatedSubscription {
    if self.status != SubscriptionStatus::Trial {
      return EvaluatedSubscription {
        subscription:   self,
        days_remaining: None,
        transitioned:   false,
      };
    }

    let Some(trial_end) = self.trial_end else {
      // Stale row: trial status with no window. Normalize rather than
      // surface a day count we cannot compute.
      let subscription = Subscription {
        status: SubscriptionStatus::Inactive,
        ..self
      };
      return EvaluatedSubscription {
        subscription,
        days_remaining: None,
        transitioned: true,
      };
    };

    if now > trial_end {
      let subscription = Subscription {
        status: SubscriptionStatus::Active,
        next_billing_date: Some(one_month_after(now)),
        ..self
      };
      return EvaluatedSubscription {
        subscription,
        days_remaining: None,
        transitioned: true,
      };
    }

    let remaining_ms = (trial_end - now).num_milliseconds();
    let days = (remaining_ms.max(0) as u64).div_ceil(MS_PER_DAY as u64) as u32;

    EvaluatedSubscription {
      subscription:   self,
      days_remaining: Some(days),
      transitioned:   false,
    }
  }

  /// Stop billing going forward. Trial and billing dates are left in place
  /// as historical record.
  pub fn cancel(self) -> Result<Self> {
    match self.status {
      SubscriptionStatus::Trial | SubscriptionStatus::Active => Ok(Self {
        status: SubscriptionStatus::Cancelled,
        ..self
      }),
      from => Err(Error::InvalidTransition {
        from,
        to: SubscriptionStatus::Cancelled,
      }),
    }
  }

  /// Resume a cancelled subscription. Billing restarts one month from
  /// `now`; the trial is not restarted.
  pub fn reactivate(self, now: DateTime<Utc>) -> Result<Self> {
    match self.status {
      SubscriptionStatus::Cancelled => Ok(Self {
        status: SubscriptionStatus::Active,
        next_billing_date: Some(one_month_after(now)),
        ..self
      }),
      from => Err(Error::InvalidTransition {
        from,
        to: SubscriptionStatus::Active,
      }),
    }
  }

  /// Advisory sync from the billing processor (webhook path). The
  /// processor's state wins; a missing billing date keeps the stored one.
  pub fn apply_external(
    self,
    status: SubscriptionStatus,
    next_billing_date: Option<DateTime<Utc>>,
  ) -> Self {
    Self {
      status,
      next_billing_date: next_billing_date.or(self.next_billing_date),
      ..self
    }
  }
}

/// `now` plus one calendar month. Falls back to 30 days on the
/// end-of-range overflow chrono guards against (unreachable with real
/// clocks).
pub fn one_month_after(now: DateTime<Utc>) -> DateTime<Utc> {
  now
    .checked_add_months(Months::new(1))
    .unwrap_or(now + TimeDelta::days(30))
}
