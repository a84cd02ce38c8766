//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed plan store, audit sink, recipient resolver
//! - `email` - Resend HTTP API notification sender
//! - `memory` - in-memory plan store for testing and development

pub mod email;
pub mod memory;
pub mod postgres;

pub use email::ResendNotificationSender;
pub use memory::InMemoryPlanStore;
pub use postgres::{PostgresAuditSink, PostgresPlanStore, PostgresRecipientResolver};
