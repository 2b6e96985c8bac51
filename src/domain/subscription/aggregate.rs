//! Quota ledger row: one subscription per user per billing cycle.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId, ValidationError};

use super::{SubscriptionStatus, SubscriptionTier, TierLimits};

/// Billing period boundaries as calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// Creates a period, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::invalid_format(
                "period_end",
                format!("{} is before period start {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// One calendar month starting at `start`.
    ///
    /// Month-end starts clamp to the last day of the following month.
    pub fn one_month_from(start: NaiveDate) -> Self {
        let end = start.checked_add_months(Months::new(1)).unwrap_or(start);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which usage counter a debit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageCounter {
    Visits,
    GuestPasses,
}

/// A subscription row as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub tier: SubscriptionTier,
    pub monthly_limit: i32,
    pub guest_limit: i32,
    pub visits_used: i32,
    pub guest_passes_used: i32,
    pub period: BillingPeriod,
    pub external_subscription_id: Option<String>,
    pub external_customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Materializes a new active row from activation fields.
    pub fn activate(fields: NewSubscription, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            user_id: fields.user_id,
            tier: fields.limits.tier,
            monthly_limit: fields.limits.monthly_visits,
            guest_limit: fields.limits.guest_passes,
            visits_used: 0,
            guest_passes_used: 0,
            period: fields.period,
            external_subscription_id: fields.external_subscription_id,
            external_customer_id: fields.external_customer_id,
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Visits left in the current period. Never negative.
    pub fn remaining_visits(&self) -> i32 {
        (self.monthly_limit - self.visits_used).max(0)
    }

    /// Guest passes left in the current period. Never negative.
    pub fn remaining_guest_passes(&self) -> i32 {
        (self.guest_limit - self.guest_passes_used).max(0)
    }

    /// Used and limit values for a counter.
    pub fn usage(&self, counter: UsageCounter) -> (i32, i32) {
        match counter {
            UsageCounter::Visits => (self.visits_used, self.monthly_limit),
            UsageCounter::GuestPasses => (self.guest_passes_used, self.guest_limit),
        }
    }

    /// True when the row was created from the given processor subscription.
    pub fn is_same_external_subscription(&self, external_id: Option<&str>) -> bool {
        matches!(
            (self.external_subscription_id.as_deref(), external_id),
            (Some(a), Some(b)) if a == b
        )
    }
}

/// Fields supplied when activating a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub limits: TierLimits,
    pub period: BillingPeriod,
    pub external_subscription_id: Option<String>,
    pub external_customer_id: Option<String>,
}

/// Result of an atomic conditional increment against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The counter was incremented; values are after the increment.
    Debited { used: i32, limit: i32 },
    /// The counter was already at its limit, or the row is no longer active.
    LimitReached,
}

impl DebitOutcome {
    pub fn is_debited(&self) -> bool {
        matches!(self, DebitOutcome::Debited { .. })
    }
}

/// Catalog price of a tier at a point in time, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub amount_cents: i64,
    pub currency: String,
}

impl PriceSnapshot {
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            amount_cents,
            currency: currency.into().to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn premium_fields() -> NewSubscription {
        NewSubscription {
            user_id: UserId::new(),
            limits: TierLimits::for_tier(SubscriptionTier::Premium),
            period: BillingPeriod::one_month_from(date(2024, 1, 15)),
            external_subscription_id: Some("sub_123".to_string()),
            external_customer_id: Some("cus_123".to_string()),
        }
    }

    #[test]
    fn billing_period_rejects_inverted_range() {
        assert!(BillingPeriod::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn one_month_period_clamps_month_end() {
        let period = BillingPeriod::one_month_from(date(2024, 1, 31));
        assert_eq!(period.end, date(2024, 2, 29));
    }

    #[test]
    fn period_contains_boundaries() {
        let period = BillingPeriod::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(period.contains(date(2024, 1, 1)));
        assert!(period.contains(date(2024, 1, 31)));
        assert!(!period.contains(date(2024, 2, 1)));
    }

    #[test]
    fn activation_starts_with_zero_usage() {
        let sub = Subscription::activate(premium_fields(), Timestamp::now());
        assert!(sub.is_active());
        assert_eq!(sub.visits_used, 0);
        assert_eq!(sub.monthly_limit, 20);
        assert_eq!(sub.remaining_visits(), 20);
        assert_eq!(sub.remaining_guest_passes(), 2);
    }

    #[test]
    fn remaining_visits_never_negative() {
        let mut sub = Subscription::activate(premium_fields(), Timestamp::now());
        sub.visits_used = 25;
        assert_eq!(sub.remaining_visits(), 0);
    }

    #[test]
    fn same_external_subscription_requires_both_sides() {
        let mut sub = Subscription::activate(premium_fields(), Timestamp::now());
        assert!(sub.is_same_external_subscription(Some("sub_123")));
        assert!(!sub.is_same_external_subscription(Some("sub_999")));
        assert!(!sub.is_same_external_subscription(None));
        sub.external_subscription_id = None;
        assert!(!sub.is_same_external_subscription(None));
    }

    #[test]
    fn price_snapshot_normalizes_currency() {
        let price = PriceSnapshot::new(4900, "USD");
        assert_eq!(price.currency, "usd");
    }
}
