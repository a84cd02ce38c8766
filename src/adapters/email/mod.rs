//! Outbound email adapters.

mod resend;

pub use resend::ResendNotificationSender;
