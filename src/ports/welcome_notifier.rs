//! Welcome notification port.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One gym slot in the welcome template. Empty strings fill unused slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GymSlot {
    pub name: String,
    pub address: String,
    pub distance: String,
}

/// Fixed-shape data for the welcome template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelcomeTemplate {
    pub first_name: String,
    pub tier: String,
    pub monthly_visits: i32,
    pub guest_passes: i32,
    pub gym1: GymSlot,
    pub gym2: GymSlot,
    pub gym3: GymSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Delivers the templated welcome message.
#[async_trait]
pub trait WelcomeNotifier: Send + Sync {
    async fn send_welcome(
        &self,
        to: &str,
        template: &WelcomeTemplate,
    ) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn WelcomeNotifier) {}
    }

    #[test]
    fn empty_slot_serializes_as_empty_strings() {
        let json = serde_json::to_value(GymSlot::default()).unwrap();
        assert_eq!(json, serde_json::json!({"name": "", "address": "", "distance": ""}));
    }
}
