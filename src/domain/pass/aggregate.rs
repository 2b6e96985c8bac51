//! Issued gym passes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GymId, PassId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{PriceSnapshot, SubscriptionTier, UsageCounter};

use super::PassCode;

/// Validity window of every pass.
pub const PASS_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    Active,
    Used,
    Expired,
}

impl PassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassStatus::Active => "active",
            PassStatus::Used => "used",
            PassStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(PassStatus::Active),
            "used" => Some(PassStatus::Used),
            "expired" => Some(PassStatus::Expired),
            _ => None,
        }
    }
}

/// Whether the pass admits the member or a guest they bring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Member,
    Guest,
}

impl PassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassKind::Member => "member",
            PassKind::Guest => "guest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(PassKind::Member),
            "guest" => Some(PassKind::Guest),
            _ => None,
        }
    }

    /// Ledger counter debited when this kind of pass is issued.
    pub fn counter(&self) -> UsageCounter {
        match self {
            PassKind::Member => UsageCounter::Visits,
            PassKind::Guest => UsageCounter::GuestPasses,
        }
    }
}

/// A time-boxed grant to enter one gym.
///
/// Tier and price are copied at issuance and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymPass {
    pub id: PassId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub gym_id: GymId,
    pub code: PassCode,
    pub kind: PassKind,
    pub status: PassStatus,
    pub issued_at: Timestamp,
    pub valid_until: Timestamp,
    pub tier: SubscriptionTier,
    pub price: PriceSnapshot,
}

impl GymPass {
    /// Builds an active pass valid for 24 hours from `issued_at`.
    pub fn issue(
        user_id: UserId,
        subscription_id: SubscriptionId,
        gym_id: GymId,
        kind: PassKind,
        tier: SubscriptionTier,
        price: PriceSnapshot,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            id: PassId::new(),
            user_id,
            subscription_id,
            gym_id,
            code: PassCode::generate(issued_at),
            kind,
            status: PassStatus::Active,
            issued_at,
            valid_until: issued_at.plus_hours(PASS_VALIDITY_HOURS),
            tier,
            price,
        }
    }

    /// Same pass with a freshly drawn code, for retrying after a collision.
    pub fn with_new_code(mut self) -> Self {
        self.code = PassCode::generate(self.issued_at);
        self
    }

    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        self.status == PassStatus::Active && !at.is_after(&self.valid_until)
    }
}
