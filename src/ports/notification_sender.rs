//! Notification sender port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ActorRole, ClientId, DomainError};
use crate::domain::notification::EventDescriptor;
use crate::domain::plan::ResolvedStage;

/// A resolved notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// Outbound notification delivery.
///
/// Every send is best-effort from the core's perspective: callers log
/// failures and never retry or propagate them.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends one client-facing digest listing the accumulated events.
    async fn send_client_digest(
        &self,
        client_id: &ClientId,
        contact: &Contact,
        actor_name: &str,
        events: &[EventDescriptor],
    ) -> Result<(), DomainError>;

    /// Sends one admin-facing digest naming the actor, role, client, and
    /// every accumulated event.
    async fn send_admin_digest(
        &self,
        admins: &[Contact],
        actor_name: &str,
        actor_role: ActorRole,
        client_name: &str,
        events: &[EventDescriptor],
    ) -> Result<(), DomainError>;

    /// Sends one summary of a freshly replaced plan to the client's
    /// primary contact.
    async fn send_plan_summary(
        &self,
        client_id: &ClientId,
        contact: &Contact,
        stages: &[ResolvedStage],
    ) -> Result<(), DomainError>;
}
