//! Notifier that records what it would have sent.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::{NotificationError, WelcomeNotifier, WelcomeTemplate};

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, WelcomeTemplate)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, WelcomeTemplate)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WelcomeNotifier for RecordingNotifier {
    async fn send_welcome(
        &self,
        to: &str,
        template: &WelcomeTemplate,
    ) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Transport("recording notifier set to fail".into()));
        }
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("lock poisoned".into()))?
            .push((to.to_string(), template.clone()));
        Ok(())
    }
}
