//! Extraction of activation fields from a completed checkout session.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{BillingPeriod, SubscriptionTier, TierLimits};

use super::errors::WebhookError;
use super::event::StripeEvent;

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: Option<String>,
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    email: Option<String>,
    name: Option<String>,
    address: Option<CustomerAddress>,
}

#[derive(Debug, Deserialize)]
struct CustomerAddress {
    postal_code: Option<String>,
}

/// Hints identifying which user a checkout belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserReference {
    pub user_id: Option<UserId>,
    pub external_id: Option<String>,
}

/// Activation fields carried by `checkout.session.completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutCompleted {
    pub session_id: Option<String>,
    pub customer_id: String,
    pub external_subscription_id: Option<String>,
    pub user_ref: UserReference,
    pub email: Option<String>,
    pub name: Option<String>,
    pub postal_code: Option<String>,
    pub limits: TierLimits,
    /// Period given explicitly in metadata, used when the processor lookup fails.
    pub metadata_period: Option<BillingPeriod>,
}

impl CheckoutCompleted {
    /// Extracts activation fields from the event's session object.
    ///
    /// # Errors
    ///
    /// - `ParseError` - object is not a checkout session or tier is unknown
    /// - `MissingField` - no customer reference
    /// - `MissingMetadata` - no tier in metadata
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let session: CheckoutSessionObject = event
            .deserialize_object()
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let customer_id = non_blank(session.customer).ok_or(WebhookError::MissingField("customer"))?;

        let tier: SubscriptionTier = session
            .metadata
            .get("tier")
            .filter(|t| !t.trim().is_empty())
            .ok_or(WebhookError::MissingMetadata("tier"))?
            .parse()
            .map_err(|e| WebhookError::ParseError(format!("tier: {}", e)))?;

        let limits = TierLimits::for_tier(tier).with_overrides(
            parse_limit(&session.metadata, "monthly_limit"),
            parse_limit(&session.metadata, "guest_limit"),
        );

        let metadata_period = match (
            parse_date(&session.metadata, "period_start"),
            parse_date(&session.metadata, "period_end"),
        ) {
            (Some(start), Some(end)) => BillingPeriod::new(start, end).ok(),
            _ => None,
        };

        let details = session.customer_details;
        let email = non_blank(session.customer_email)
            .or_else(|| details.as_ref().and_then(|d| non_blank(d.email.clone())));
        let name = details.as_ref().and_then(|d| non_blank(d.name.clone()));
        let postal_code = details
            .and_then(|d| d.address)
            .and_then(|a| non_blank(a.postal_code));

        Ok(Self {
            session_id: session.id,
            customer_id,
            external_subscription_id: non_blank(session.subscription),
            user_ref: user_reference(&session.metadata, session.client_reference_id),
            email,
            name,
            postal_code,
            limits,
            metadata_period,
        })
    }
}

/// `metadata.user_id` wins; a UUID-shaped `client_reference_id` is the next
/// best internal id, any other reference is treated as an external identity.
fn user_reference(
    metadata: &HashMap<String, String>,
    client_reference_id: Option<String>,
) -> UserReference {
    let mut reference = UserReference {
        user_id: metadata.get("user_id").and_then(|v| v.trim().parse().ok()),
        external_id: metadata
            .get("external_id")
            .and_then(|v| non_blank(Some(v.clone()))),
    };

    if let Some(client_ref) = non_blank(client_reference_id) {
        match client_ref.parse::<UserId>() {
            Ok(id) if reference.user_id.is_none() => reference.user_id = Some(id),
            Ok(_) => {}
            Err(_) if reference.external_id.is_none() => reference.external_id = Some(client_ref),
            Err(_) => {}
        }
    }

    reference
}

fn parse_limit(metadata: &HashMap<String, String>, key: &str) -> Option<i32> {
    metadata.get(key).and_then(|v| v.trim().parse().ok())
}

fn parse_date(metadata: &HashMap<String, String>, key: &str) -> Option<NaiveDate> {
    metadata
        .get(key)
        .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(object: serde_json::Value) -> StripeEvent {
        StripeEvent::new("evt_test_123", "checkout.session.completed", 1_704_067_200, object)
    }

    #[test]
    fn extracts_full_session() {
        let user_id = UserId::new();
        let checkout = CheckoutCompleted::from_event(&event(json!({
            "id": "cs_1",
            "customer": "cus_1",
            "subscription": "sub_1",
            "customer_email": "ana@example.com",
            "customer_details": {
                "name": "Ana",
                "address": { "postal_code": "94107" }
            },
            "metadata": {
                "tier": "premium",
                "user_id": user_id.to_string(),
                "period_start": "2024-01-01",
                "period_end": "2024-02-01"
            }
        })))
        .unwrap();

        assert_eq!(checkout.customer_id, "cus_1");
        assert_eq!(checkout.external_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(checkout.user_ref.user_id, Some(user_id));
        assert_eq!(checkout.email.as_deref(), Some("ana@example.com"));
        assert_eq!(checkout.name.as_deref(), Some("Ana"));
        assert_eq!(checkout.postal_code.as_deref(), Some("94107"));
        assert_eq!(checkout.limits, TierLimits::for_tier(SubscriptionTier::Premium));
        let period = checkout.metadata_period.unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn metadata_limits_override_tier_defaults() {
        let checkout = CheckoutCompleted::from_event(&event(json!({
            "customer": "cus_1",
            "metadata": { "tier": "standard", "monthly_limit": "12", "guest_limit": "1" }
        })))
        .unwrap();

        assert_eq!(checkout.limits.monthly_visits, 12);
        assert_eq!(checkout.limits.guest_passes, 1);
    }

    #[test]
    fn missing_tier_is_missing_metadata() {
        let result = CheckoutCompleted::from_event(&event(json!({ "customer": "cus_1" })));
        assert!(matches!(result, Err(WebhookError::MissingMetadata("tier"))));
    }

    #[test]
    fn unknown_tier_is_parse_error() {
        let result = CheckoutCompleted::from_event(&event(json!({
            "customer": "cus_1",
            "metadata": { "tier": "platinum" }
        })));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn missing_customer_is_missing_field() {
        let result = CheckoutCompleted::from_event(&event(json!({
            "metadata": { "tier": "elite" }
        })));
        assert!(matches!(result, Err(WebhookError::MissingField("customer"))));
    }

    #[test]
    fn non_uuid_client_reference_is_external_identity() {
        let checkout = CheckoutCompleted::from_event(&event(json!({
            "customer": "cus_1",
            "client_reference_id": "auth0|abc",
            "metadata": { "tier": "elite" }
        })))
        .unwrap();

        assert_eq!(checkout.user_ref.user_id, None);
        assert_eq!(checkout.user_ref.external_id.as_deref(), Some("auth0|abc"));
    }

    #[test]
    fn inverted_metadata_period_is_dropped() {
        let checkout = CheckoutCompleted::from_event(&event(json!({
            "customer": "cus_1",
            "metadata": { "tier": "elite", "period_start": "2024-02-01", "period_end": "2024-01-01" }
        })))
        .unwrap();

        assert!(checkout.metadata_period.is_none());
    }
}
