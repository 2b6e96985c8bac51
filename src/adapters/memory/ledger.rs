//! In-memory quota ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{
    DebitOutcome, NewSubscription, Subscription, SubscriptionStatus, UsageCounter,
};
use crate::ports::SubscriptionLedger;

use super::lock;

#[derive(Default)]
pub struct InMemorySubscriptionLedger {
    rows: Mutex<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row as-is, bypassing the activation rules.
    pub fn seed(&self, subscription: Subscription) -> Result<(), DomainError> {
        lock(&self.rows)?.insert(subscription.id, subscription);
        Ok(())
    }

    /// Every row for a user, oldest first.
    pub fn rows_for_user(&self, user_id: &UserId) -> Vec<Subscription> {
        let mut rows: Vec<Subscription> = self
            .rows
            .lock()
            .map(|rows| rows.values().filter(|s| &s.user_id == user_id).cloned().collect())
            .unwrap_or_default();
        rows.sort_by_key(|s| s.created_at);
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn counter_mut(sub: &mut Subscription, counter: UsageCounter) -> (&mut i32, i32) {
    match counter {
        UsageCounter::Visits => (&mut sub.visits_used, sub.monthly_limit),
        UsageCounter::GuestPasses => (&mut sub.guest_passes_used, sub.guest_limit),
    }
}

#[async_trait]
impl SubscriptionLedger for InMemorySubscriptionLedger {
    async fn current_active(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        Ok(lock(&self.rows)?
            .values()
            .find(|s| &s.user_id == user_id && s.is_active())
            .cloned())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(lock(&self.rows)?.get(id).cloned())
    }

    async fn debit(
        &self,
        id: &SubscriptionId,
        counter: UsageCounter,
    ) -> Result<DebitOutcome, DomainError> {
        let mut rows = lock(&self.rows)?;
        let Some(sub) = rows.get_mut(id).filter(|s| s.is_active()) else {
            return Ok(DebitOutcome::LimitReached);
        };

        let (used, limit) = counter_mut(sub, counter);
        if *used >= limit {
            return Ok(DebitOutcome::LimitReached);
        }
        *used += 1;
        let used = *used;
        sub.updated_at = Timestamp::now();

        Ok(DebitOutcome::Debited { used, limit })
    }

    async fn refund(&self, id: &SubscriptionId, counter: UsageCounter) -> Result<bool, DomainError> {
        let mut rows = lock(&self.rows)?;
        let Some(sub) = rows.get_mut(id) else {
            return Ok(false);
        };

        let (used, _) = counter_mut(sub, counter);
        if *used <= 0 {
            return Ok(false);
        }
        *used -= 1;
        sub.updated_at = Timestamp::now();
        Ok(true)
    }

    async fn replace_active(&self, fields: NewSubscription) -> Result<Subscription, DomainError> {
        let mut rows = lock(&self.rows)?;
        let now = Timestamp::now();

        if let Some(current) = rows
            .values()
            .find(|s| s.user_id == fields.user_id && s.is_active())
        {
            if current.is_same_external_subscription(fields.external_subscription_id.as_deref()) {
                return Ok(current.clone());
            }
        }

        for sub in rows
            .values_mut()
            .filter(|s| s.user_id == fields.user_id && s.is_active())
        {
            sub.status = SubscriptionStatus::Cancelled;
            sub.updated_at = now;
        }

        let created = Subscription::activate(fields, now);
        rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_external_id(
        &self,
        external_id: &str,
        status: SubscriptionStatus,
        period_end: Option<NaiveDate>,
    ) -> Result<bool, DomainError> {
        let mut rows = lock(&self.rows)?;
        let now = Timestamp::now();
        let mut matched = false;
        let active: Vec<(UserId, SubscriptionId)> = rows
            .values()
            .filter(|s| s.is_active())
            .map(|s| (s.user_id, s.id))
            .collect();

        for sub in rows
            .values_mut()
            .filter(|s| s.external_subscription_id.as_deref() == Some(external_id))
        {
            // A replaced row is never reactivated while another row is active.
            let blocked = status.is_active()
                && !sub.is_active()
                && active.iter().any(|(user, id)| *user == sub.user_id && *id != sub.id);
            if !blocked {
                sub.status = status;
            }
            if let Some(end) = period_end.filter(|end| *end >= sub.period.start) {
                sub.period.end = end;
            }
            sub.updated_at = now;
            matched = true;
        }

        Ok(matched)
    }
}
