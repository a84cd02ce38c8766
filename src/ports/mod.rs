//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PlanStore` - transactional relational store for plans and snapshots
//! - `AuditSink` - best-effort audit trail
//! - `NotificationSender` - outbound digest and summary notifications
//! - `RecipientResolver` - contact/admin address lookup

mod audit_sink;
mod notification_sender;
mod plan_store;
mod recipient_resolver;

pub use audit_sink::AuditSink;
pub use notification_sender::{Contact, NotificationSender};
pub use plan_store::PlanStore;
pub use recipient_resolver::RecipientResolver;
