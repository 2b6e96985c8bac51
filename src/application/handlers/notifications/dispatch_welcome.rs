//! NotificationDispatcher - best-effort welcome delivery.
//!
//! Never returns an error: any failure is logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::handlers::gyms::NearbyGym;
use crate::domain::subscription::TierLimits;
use crate::ports::{GymSlot, WelcomeNotifier, WelcomeTemplate};

const GYM_SLOTS: usize = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What to tell a newly activated member.
#[derive(Debug, Clone)]
pub struct WelcomeMessage {
    pub to: String,
    pub first_name: String,
    pub limits: TierLimits,
    pub gyms: Vec<NearbyGym>,
}

impl WelcomeMessage {
    /// Renders the fixed-shape template; missing gym slots are empty strings.
    pub fn template(&self) -> WelcomeTemplate {
        let mut slots = self.gyms.iter().take(GYM_SLOTS).map(slot);
        WelcomeTemplate {
            first_name: self.first_name.clone(),
            tier: self.limits.tier.display_name().to_string(),
            monthly_visits: self.limits.monthly_visits,
            guest_passes: self.limits.guest_passes,
            gym1: slots.next().unwrap_or_default(),
            gym2: slots.next().unwrap_or_default(),
            gym3: slots.next().unwrap_or_default(),
        }
    }
}

fn slot(nearby: &NearbyGym) -> GymSlot {
    GymSlot {
        name: nearby.gym.name.clone(),
        address: nearby.gym.display_address(),
        distance: nearby
            .distance_km
            .map(|d| format!("{:.1} km", d))
            .unwrap_or_default(),
    }
}

pub struct NotificationDispatcher {
    notifier: Arc<dyn WelcomeNotifier>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn WelcomeNotifier>) -> Self {
        Self {
            notifier,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends the welcome message. Returns whether it was delivered.
    pub async fn send_welcome(&self, message: &WelcomeMessage) -> bool {
        let template = message.template();
        let delivery = self.notifier.send_welcome(&message.to, &template);

        match tokio::time::timeout(self.timeout, delivery).await {
            Ok(Ok(())) => {
                info!(gyms = message.gyms.len(), "Sent welcome notification");
                true
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Welcome notification failed");
                false
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Welcome notification timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingNotifier;
    use crate::domain::foundation::GymId;
    use crate::domain::gym::Gym;
    use crate::domain::subscription::SubscriptionTier;
    use crate::ports::NotificationError;
    use async_trait::async_trait;

    struct SlowNotifier;

    #[async_trait]
    impl WelcomeNotifier for SlowNotifier {
        async fn send_welcome(
            &self,
            _to: &str,
            _template: &WelcomeTemplate,
        ) -> Result<(), NotificationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn nearby(id: i64, distance_km: Option<f64>) -> NearbyGym {
        NearbyGym {
            gym: Gym {
                id: GymId::new(id),
                name: format!("Gym {}", id),
                address: "1 Main St".to_string(),
                city: Some("Springfield".to_string()),
                postal_code: None,
                chain: None,
                coordinate: None,
                is_active: true,
            },
            distance_km,
        }
    }

    fn message(gyms: Vec<NearbyGym>) -> WelcomeMessage {
        WelcomeMessage {
            to: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            limits: TierLimits::for_tier(SubscriptionTier::Premium),
            gyms,
        }
    }

    #[test]
    fn template_pads_missing_slots_with_empty_strings() {
        let template = message(vec![nearby(1, Some(1.234))]).template();

        assert_eq!(template.gym1.name, "Gym 1");
        assert_eq!(template.gym1.address, "1 Main St, Springfield");
        assert_eq!(template.gym1.distance, "1.2 km");
        assert_eq!(template.gym2, GymSlot::default());
        assert_eq!(template.gym3, GymSlot::default());
        assert_eq!(template.tier, "Premium");
        assert_eq!(template.monthly_visits, 20);
    }

    #[test]
    fn template_uses_at_most_three_gyms() {
        let gyms = (1..=5).map(|i| nearby(i, None)).collect();
        let template = message(gyms).template();

        assert_eq!(template.gym3.name, "Gym 3");
        assert_eq!(template.gym3.distance, "");
    }

    #[tokio::test]
    async fn delivered_message_is_recorded() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        assert!(dispatcher.send_welcome(&message(vec![])).await);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ana@example.com");
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let dispatcher = NotificationDispatcher::new(Arc::new(RecordingNotifier::failing()));
        assert!(!dispatcher.send_welcome(&message(vec![])).await);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_delivery_times_out() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(SlowNotifier)).with_timeout(Duration::from_secs(1));
        assert!(!dispatcher.send_welcome(&message(vec![])).await);
    }
}
