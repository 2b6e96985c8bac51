//! Quota ledger port.
//!
//! # Contract
//!
//! - At most one `active` subscription exists per user at any time.
//! - `debit` is a single conditional increment: it never reads the counter
//!   in one step and writes it in another.
//! - `replace_active` cancels the previous active row and inserts the new one
//!   as one all-or-nothing unit.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, SubscriptionId, UserId};
use crate::domain::subscription::{
    DebitOutcome, NewSubscription, Subscription, SubscriptionStatus, UsageCounter,
};

#[async_trait]
pub trait SubscriptionLedger: Send + Sync {
    /// The user's active subscription, if any.
    async fn current_active(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Increments `counter` by one only if the row is active and under its limit.
    async fn debit(
        &self,
        id: &SubscriptionId,
        counter: UsageCounter,
    ) -> Result<DebitOutcome, DomainError>;

    /// Decrements `counter` by one, never below zero.
    ///
    /// Returns `false` when there was nothing to give back.
    async fn refund(&self, id: &SubscriptionId, counter: UsageCounter) -> Result<bool, DomainError>;

    /// Cancels the user's active subscription and activates `fields`.
    ///
    /// When the active row already carries the same external subscription
    /// reference it is returned unchanged.
    async fn replace_active(&self, fields: NewSubscription) -> Result<Subscription, DomainError>;

    /// Mirrors a processor status change onto the row with the given
    /// external reference. Returns `false` when no row matches.
    async fn update_by_external_id(
        &self,
        external_id: &str,
        status: SubscriptionStatus,
        period_end: Option<NaiveDate>,
    ) -> Result<bool, DomainError>;
}
