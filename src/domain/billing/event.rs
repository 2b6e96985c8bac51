//! Processor event envelope.
//!
//! Only `id`, `type`, `created` and `data.object` are read. Unknown fields
//! are dropped on deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// One webhook delivery. Redeliveries reuse `id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unix seconds.
    pub created: i64,
    pub data: StripeEventData,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        created: i64,
        object: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            created,
            data: StripeEventData { object },
            livemode: false,
        }
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// `created` as a timestamp; out-of-range values read as now.
    pub fn created_at(&self) -> Timestamp {
        Timestamp::from_unix_secs(self.created).unwrap_or_else(Timestamp::now)
    }

    /// Decodes `data.object` into the shape the event type implies.
    pub fn deserialize_object<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    Unknown,
}

impl StripeEventType {
    const KNOWN: [(&'static str, StripeEventType); 3] = [
        ("checkout.session.completed", Self::CheckoutSessionCompleted),
        ("customer.subscription.updated", Self::CustomerSubscriptionUpdated),
        ("customer.subscription.deleted", Self::CustomerSubscriptionDeleted),
    ];

    pub fn parse(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(name, _)| *name == s)
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        Self::KNOWN
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("unknown", |(name, _)| name)
    }
}
