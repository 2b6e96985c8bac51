//! Tier-based visit allowances.

use super::SubscriptionTier;
use serde::{Deserialize, Serialize};

/// Monthly allowances for a subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// The tier these limits apply to.
    pub tier: SubscriptionTier,
    /// Gym visits per billing period.
    pub monthly_visits: i32,
    /// Guest passes per billing period.
    pub guest_passes: i32,
}

impl TierLimits {
    /// Default allowances for a tier.
    ///
    /// | Tier | Visits | Guest passes |
    /// |------|--------|--------------|
    /// | Standard | 8 | 0 |
    /// | Premium | 20 | 2 |
    /// | Elite | 40 | 5 |
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Standard => Self {
                tier,
                monthly_visits: 8,
                guest_passes: 0,
            },
            SubscriptionTier::Premium => Self {
                tier,
                monthly_visits: 20,
                guest_passes: 2,
            },
            SubscriptionTier::Elite => Self {
                tier,
                monthly_visits: 40,
                guest_passes: 5,
            },
        }
    }

    /// Replaces the defaults with explicit values where present.
    ///
    /// Negative overrides are ignored.
    pub fn with_overrides(mut self, monthly_visits: Option<i32>, guest_passes: Option<i32>) -> Self {
        if let Some(v) = monthly_visits.filter(|v| *v >= 0) {
            self.monthly_visits = v;
        }
        if let Some(g) = guest_passes.filter(|g| *g >= 0) {
            self.guest_passes = g;
        }
        self
    }
}
