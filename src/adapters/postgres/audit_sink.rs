//! PostgreSQL implementation of AuditSink.
//!
//! Inserts one row per audit entry. Failures are logged and swallowed:
//! the port contract forbids audit errors from reaching the caller.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{ActorRole, ClientId, Timestamp};
use crate::ports::AuditSink;

/// PostgreSQL implementation of AuditSink.
#[derive(Clone)]
pub struct PostgresAuditSink {
    pool: PgPool,
}

impl PostgresAuditSink {
    /// Creates a new PostgresAuditSink.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn record(&self, client_id: &ClientId, action: &str, actor_role: ActorRole) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_log (id, client_id, action, actor_role, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client_id.as_uuid())
        .bind(action)
        .bind(actor_role.as_str())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            tracing::warn!(
                client_id = %client_id,
                action,
                error = %err,
                "audit entry insert failed"
            );
        }
    }
}
