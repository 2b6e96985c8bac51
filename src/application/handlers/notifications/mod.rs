//! Notification dispatch.

mod dispatch_welcome;

pub use dispatch_welcome::{NotificationDispatcher, WelcomeMessage};
