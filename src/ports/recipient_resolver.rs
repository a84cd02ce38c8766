//! Recipient resolver port.

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError};

use super::notification_sender::Contact;

/// Resolves notification recipients.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// Resolves the client's primary contact.
    ///
    /// Returns `None` when the client has no contact address on file;
    /// callers abandon the notification in that case.
    async fn resolve_client_contact(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<Contact>, DomainError>;

    /// Resolves the administrative recipients.
    async fn resolve_admins(&self) -> Result<Vec<Contact>, DomainError>;
}
