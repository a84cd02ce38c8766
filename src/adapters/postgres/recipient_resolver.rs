//! PostgreSQL implementation of RecipientResolver.
//!
//! Client contacts live on the client row; admins are the portal users
//! with the admin role.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{ClientId, DomainError};
use crate::ports::{Contact, RecipientResolver};

/// PostgreSQL implementation of RecipientResolver.
#[derive(Clone)]
pub struct PostgresRecipientResolver {
    pool: PgPool,
}

impl PostgresRecipientResolver {
    /// Creates a new PostgresRecipientResolver.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientResolver for PostgresRecipientResolver {
    async fn resolve_client_contact(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<Contact>, DomainError> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT contact_name, contact_email FROM clients WHERE id = $1",
        )
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch client contact: {}", e)))?;

        // A client row without an email counts as no contact on file.
        Ok(row.and_then(|(name, email)| {
            email.map(|email| Contact {
                name: name.unwrap_or_default(),
                email,
            })
        }))
    }

    async fn resolve_admins(&self) -> Result<Vec<Contact>, DomainError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT name, email FROM portal_users WHERE role = 'admin' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch admins: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(name, email)| Contact { name, email })
            .collect())
    }
}
