//! Transactional email adapter (Resend).

mod resend;

pub use resend::{ResendConfig, ResendNotifier};
