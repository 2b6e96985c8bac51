//! Status changes carried by `customer.subscription.*` events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{BillingPeriod, SubscriptionStatus};

use super::errors::WebhookError;
use super::event::StripeEvent;

/// Processor subscription object, shared by webhook payloads and API responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Option<String>,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

impl SubscriptionObject {
    /// Current period as UTC calendar dates, when both bounds are present.
    pub fn period(&self) -> Option<BillingPeriod> {
        let start = unix_to_date(self.current_period_start?)?;
        let end = unix_to_date(self.current_period_end?)?;
        BillingPeriod::new(start, end).ok()
    }

    pub fn period_end(&self) -> Option<NaiveDate> {
        self.current_period_end.and_then(unix_to_date)
    }
}

fn unix_to_date(secs: i64) -> Option<NaiveDate> {
    Timestamp::from_unix_secs(secs).map(|t| t.date())
}

/// A change to apply to the ledger row matching `external_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub external_id: String,
    pub status: SubscriptionStatus,
    pub period_end: Option<NaiveDate>,
}

impl SubscriptionChange {
    /// Reads an updated subscription, mirroring its status and period end.
    pub fn updated(event: &StripeEvent) -> Result<Self, WebhookError> {
        let object = parse_object(event)?;
        let status = object
            .status
            .parse()
            .map_err(|e| WebhookError::ParseError(format!("status: {}", e)))?;

        Ok(Self {
            period_end: object.period_end(),
            external_id: object.id,
            status,
        })
    }

    /// Reads a deleted subscription; the status is always cancelled.
    pub fn deleted(event: &StripeEvent) -> Result<Self, WebhookError> {
        let object = parse_object(event)?;

        Ok(Self {
            period_end: object.period_end(),
            external_id: object.id,
            status: SubscriptionStatus::Cancelled,
        })
    }
}

fn parse_object(event: &StripeEvent) -> Result<SubscriptionObject, WebhookError> {
    let object: SubscriptionObject = event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(e.to_string()))?;
    if object.id.trim().is_empty() {
        return Err(WebhookError::MissingField("id"));
    }
    Ok(object)
}
