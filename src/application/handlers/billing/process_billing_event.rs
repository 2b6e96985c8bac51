//! BillingEventProcessor - applies verified billing events to the ledger.
//!
//! Runs after the webhook has been acknowledged. Every delivery first claims
//! the event id in the processed-event ledger; only the claimant applies it,
//! and the outcome is written back so a failed attempt can be retried by the
//! next redelivery.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::handlers::gyms::NearestGymsService;
use crate::application::handlers::notifications::{NotificationDispatcher, WelcomeMessage};
use crate::domain::billing::{
    CheckoutCompleted, StripeEvent, StripeEventType, SubscriptionChange, WebhookError,
};
use crate::domain::foundation::{ExternalIdentity, SubscriptionId, UserId};
use crate::domain::subscription::{BillingPeriod, NewSubscription, SubscriptionStatus};
use crate::domain::user::User;
use crate::ports::{
    BillingClient, ClaimResult, Geocoder, SubscriptionLedger, UserRepository, WebhookEventRecord,
    WebhookEventRepository, WebhookOutcome,
};

/// Number of gyms featured in the welcome message.
const WELCOME_GYM_COUNT: usize = 3;

const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// What applying an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEventResult {
    /// Checkout completed; the user's active subscription was replaced.
    SubscriptionActivated {
        user_id: UserId,
        subscription_id: SubscriptionId,
        welcome_sent: bool,
    },
    /// Status and period end mirrored onto the matching row.
    SubscriptionUpdated {
        external_id: String,
        status: SubscriptionStatus,
    },
    /// The matching row was cancelled.
    SubscriptionCancelled { external_id: String },
    /// A previous delivery of the same event already claimed it.
    AlreadyProcessed,
    /// Event acknowledged but no action taken.
    Ignored(String),
}

pub struct BillingEventProcessor {
    users: Arc<dyn UserRepository>,
    ledger: Arc<dyn SubscriptionLedger>,
    billing: Arc<dyn BillingClient>,
    geocoder: Arc<dyn Geocoder>,
    gyms: Arc<NearestGymsService>,
    notifications: Arc<NotificationDispatcher>,
    events: Arc<dyn WebhookEventRepository>,
    geocode_timeout: Duration,
}

impl BillingEventProcessor {
    pub fn new(
        users: Arc<dyn UserRepository>,
        ledger: Arc<dyn SubscriptionLedger>,
        billing: Arc<dyn BillingClient>,
        geocoder: Arc<dyn Geocoder>,
        gyms: Arc<NearestGymsService>,
        notifications: Arc<NotificationDispatcher>,
        events: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            users,
            ledger,
            billing,
            geocoder,
            gyms,
            notifications,
            events,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }

    /// Upper bound on the postal code lookup; past it the fallback gyms are used.
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Processes `event` on its own task. Failures are reported through
    /// `tracing` only; nothing is returned to the caller that spawned it.
    pub fn spawn(self: Arc<Self>, event: StripeEvent) -> JoinHandle<()> {
        tokio::spawn(async move {
            let event_id = event.id.clone();
            let event_type = event.event_type.clone();
            match self.process(event).await {
                Ok(result) => {
                    debug!(event_id = %event_id, event_type = %event_type, ?result, "Billing event processed");
                }
                Err(err) => {
                    error!(
                        event_id = %event_id,
                        event_type = %event_type,
                        error = %err,
                        retryable = err.is_retryable(),
                        "Billing event processing failed"
                    );
                }
            }
        })
    }

    /// Claims the event, applies it, and records the outcome.
    pub async fn process(&self, event: StripeEvent) -> Result<BillingEventResult, WebhookError> {
        let payload = serde_json::to_value(&event).unwrap_or(serde_json::Value::Null);
        let claim = WebhookEventRecord::claim(event.id.clone(), event.event_type.clone(), payload);

        if self.events.try_claim(claim).await? == ClaimResult::AlreadyProcessed {
            info!(event_id = %event.id, "Skipping already processed billing event");
            return Ok(BillingEventResult::AlreadyProcessed);
        }

        let result = self.apply(&event).await;

        let (outcome, message) = match &result {
            Ok(BillingEventResult::Ignored(reason)) => (WebhookOutcome::Ignored, Some(reason.clone())),
            Ok(_) => (WebhookOutcome::Success, None),
            Err(err) => (WebhookOutcome::Failed, Some(err.to_string())),
        };
        if let Err(err) = self.events.record_outcome(&event.id, outcome, message).await {
            warn!(event_id = %event.id, error = %err, "Failed to record billing event outcome");
        }

        result
    }

    async fn apply(&self, event: &StripeEvent) -> Result<BillingEventResult, WebhookError> {
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.handle_checkout_completed(event).await,
            StripeEventType::CustomerSubscriptionUpdated => {
                let change = SubscriptionChange::updated(event)?;
                self.apply_change(event, change).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                let change = SubscriptionChange::deleted(event)?;
                self.apply_change(event, change).await
            }
            StripeEventType::Unknown => {
                debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring unhandled billing event type");
                Ok(BillingEventResult::Ignored(format!(
                    "unhandled event type {}",
                    event.event_type
                )))
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<BillingEventResult, WebhookError> {
        let checkout = CheckoutCompleted::from_event(event)?;
        let user = self.resolve_user(&checkout).await?;

        // 1. Remember the processor customer on the user
        self.users
            .set_billing_customer(&user.id, &checkout.customer_id)
            .await?;

        // 2. Replace the active subscription
        let period = self.resolve_period(event, &checkout).await;
        let subscription = self
            .ledger
            .replace_active(NewSubscription {
                user_id: user.id,
                limits: checkout.limits,
                period,
                external_subscription_id: checkout.external_subscription_id.clone(),
                external_customer_id: Some(checkout.customer_id.clone()),
            })
            .await?;

        info!(
            event_id = %event.id,
            user_id = %user.id,
            subscription_id = %subscription.id,
            tier = %checkout.limits.tier,
            "Subscription activated"
        );

        // 3. Everything below is best effort
        let origin = match self.home_postal_code(&user, &checkout).await {
            Some(zip) => {
                match tokio::time::timeout(self.geocode_timeout, self.geocoder.geocode(&zip)).await {
                    Ok(Some(coordinate)) => Some(coordinate),
                    Ok(None) => {
                        warn!(event_id = %event.id, user_id = %user.id, "Could not geocode postal code, using fallback gyms");
                        None
                    }
                    Err(_) => {
                        warn!(
                            event_id = %event.id,
                            user_id = %user.id,
                            timeout_ms = self.geocode_timeout.as_millis() as u64,
                            "Geocoding timed out, using fallback gyms"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let gyms = match self.gyms.nearest(origin, WELCOME_GYM_COUNT).await {
            Ok(gyms) => gyms,
            Err(err) => {
                warn!(event_id = %event.id, error = %err, "Gym lookup failed, sending welcome without gyms");
                Vec::new()
            }
        };

        let welcome_sent = match user.email.clone().or_else(|| checkout.email.clone()) {
            Some(to) => {
                let message = WelcomeMessage {
                    to,
                    first_name: first_name(&user, &checkout),
                    limits: checkout.limits,
                    gyms,
                };
                self.notifications.send_welcome(&message).await
            }
            None => {
                warn!(event_id = %event.id, user_id = %user.id, "No email address, skipping welcome");
                false
            }
        };

        Ok(BillingEventResult::SubscriptionActivated {
            user_id: user.id,
            subscription_id: subscription.id,
            welcome_sent,
        })
    }

    async fn apply_change(
        &self,
        event: &StripeEvent,
        change: SubscriptionChange,
    ) -> Result<BillingEventResult, WebhookError> {
        let matched = self
            .ledger
            .update_by_external_id(&change.external_id, change.status, change.period_end)
            .await?;

        if !matched {
            // Events can arrive before the checkout that creates the row.
            info!(
                event_id = %event.id,
                external_id = %change.external_id,
                "No subscription matches billing event"
            );
            return Ok(BillingEventResult::Ignored(format!(
                "no subscription with external id {}",
                change.external_id
            )));
        }

        if change.status == SubscriptionStatus::Cancelled {
            Ok(BillingEventResult::SubscriptionCancelled {
                external_id: change.external_id,
            })
        } else {
            Ok(BillingEventResult::SubscriptionUpdated {
                external_id: change.external_id,
                status: change.status,
            })
        }
    }

    /// Stored customer mapping first, then the ids carried in the session.
    async fn resolve_user(&self, checkout: &CheckoutCompleted) -> Result<User, WebhookError> {
        if let Some(user) = self
            .users
            .find_by_billing_customer(&checkout.customer_id)
            .await?
        {
            return Ok(user);
        }

        if let Some(user_id) = &checkout.user_ref.user_id {
            if let Some(user) = self.users.find_by_id(user_id).await? {
                return Ok(user);
            }
        }

        if let Some(external) = &checkout.user_ref.external_id {
            if let Ok(external) = ExternalIdentity::new(external.as_str()) {
                if let Some(user) = self.users.find_by_external_id(&external).await? {
                    return Ok(user);
                }
            }
        }

        Err(WebhookError::UserNotFound)
    }

    async fn resolve_period(&self, event: &StripeEvent, checkout: &CheckoutCompleted) -> BillingPeriod {
        if let Some(external_id) = &checkout.external_subscription_id {
            match self.billing.retrieve_subscription(external_id).await {
                Ok(Some(sub)) => {
                    if let Some(period) = sub.period {
                        return period;
                    }
                }
                Ok(None) => {
                    warn!(event_id = %event.id, external_id = %external_id, "Processor has no such subscription");
                }
                Err(err) => {
                    warn!(event_id = %event.id, error = %err, "Subscription lookup failed, using fallback period");
                }
            }
        }

        if let Some(period) = checkout.metadata_period {
            return period;
        }

        warn!(event_id = %event.id, "No billing period available, assuming one month from event date");
        BillingPeriod::one_month_from(event.created_at().date())
    }

    /// The user's stored postal code, else the checkout's (persisted on first use).
    async fn home_postal_code(&self, user: &User, checkout: &CheckoutCompleted) -> Option<String> {
        if let Some(zip) = user.postal_code.clone() {
            return Some(zip);
        }
        let zip = checkout.postal_code.clone()?;
        if let Err(err) = self.users.set_postal_code(&user.id, &zip).await {
            warn!(user_id = %user.id, error = %err, "Failed to store postal code");
        }
        Some(zip)
    }
}

fn first_name(user: &User, checkout: &CheckoutCompleted) -> String {
    let full = user
        .display_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| checkout.name.clone())
        .unwrap_or_else(|| user.greeting_name());
    full.split_whitespace()
        .next()
        .map(String::from)
        .unwrap_or(full)
}
