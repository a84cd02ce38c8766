//! PostgreSQL adapters.

mod audit_sink;
mod plan_store;
mod recipient_resolver;

pub use audit_sink::PostgresAuditSink;
pub use plan_store::PostgresPlanStore;
pub use recipient_resolver::PostgresRecipientResolver;
