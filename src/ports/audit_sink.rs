//! Audit sink port.

use async_trait::async_trait;

use crate::domain::foundation::{ActorRole, ClientId};

/// Best-effort audit trail for notable plan events.
///
/// The signature is infallible on purpose: audit failures must never
/// reach the caller or roll back the operation that produced them.
/// Implementations swallow and log their own errors.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one audit entry for the client.
    async fn record(&self, client_id: &ClientId, action: &str, actor_role: ActorRole);
}
