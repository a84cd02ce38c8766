//! ReplacePlanHandler - Command handler for replacing a client's plan.
//!
//! The replace is a full delete-then-reinsert, never a diff: callers
//! submit the complete desired plan every time. Everything after the
//! commit (audit entries, progress recomputation, the optional summary
//! notification) is best-effort and logged, never surfaced.

use std::sync::Arc;

use crate::domain::foundation::{today, ActorRole, ClientId, DomainError, ValidationError};
use crate::domain::plan::{resolve_plan, validate_drafts, PlanProgress, ResolvedStage, StageDraft};
use crate::ports::{AuditSink, NotificationSender, PlanStore, RecipientResolver};

use super::super::progress::RecomputeProgressHandler;

/// Command to replace a client's entire stage plan.
#[derive(Debug, Clone)]
pub struct ReplacePlanCommand {
    /// The client whose plan is replaced.
    pub client_id: ClientId,
    /// The complete desired plan, in order.
    pub stages: Vec<StageDraft>,
    /// Role of the caller, recorded on audit entries.
    pub actor_role: ActorRole,
    /// When set, the client's primary contact receives one summary of
    /// the new plan after the commit.
    pub notify_contact: bool,
}

/// Result of a successful plan replacement.
#[derive(Debug, Clone)]
pub struct ReplacePlanResult {
    /// The resolved plan as persisted.
    pub stages: Vec<ResolvedStage>,
    /// The recomputed progress, or `None` when post-commit aggregation
    /// failed (the replace itself still succeeded).
    pub progress: Option<PlanProgress>,
}

/// Error type for plan replacement.
#[derive(Debug, Clone)]
pub enum ReplacePlanError {
    /// Input rejected before any store access.
    Validation(ValidationError),
    /// Store failure; the whole replace was rolled back.
    Store(DomainError),
}

impl std::fmt::Display for ReplacePlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplacePlanError::Validation(err) => write!(f, "{}", err),
            ReplacePlanError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ReplacePlanError {}

impl From<ValidationError> for ReplacePlanError {
    fn from(err: ValidationError) -> Self {
        ReplacePlanError::Validation(err)
    }
}

impl From<DomainError> for ReplacePlanError {
    fn from(err: DomainError) -> Self {
        ReplacePlanError::Store(err)
    }
}

/// Handler for replacing stage plans.
pub struct ReplacePlanHandler {
    plan_store: Arc<dyn PlanStore>,
    audit_sink: Arc<dyn AuditSink>,
    recipient_resolver: Arc<dyn RecipientResolver>,
    notification_sender: Arc<dyn NotificationSender>,
    aggregator: Arc<RecomputeProgressHandler>,
}

impl ReplacePlanHandler {
    pub fn new(
        plan_store: Arc<dyn PlanStore>,
        audit_sink: Arc<dyn AuditSink>,
        recipient_resolver: Arc<dyn RecipientResolver>,
        notification_sender: Arc<dyn NotificationSender>,
        aggregator: Arc<RecomputeProgressHandler>,
    ) -> Self {
        Self {
            plan_store,
            audit_sink,
            recipient_resolver,
            notification_sender,
            aggregator,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReplacePlanCommand,
    ) -> Result<ReplacePlanResult, ReplacePlanError> {
        // 1. Validate before any store access
        validate_drafts(&cmd.stages)?;

        // 2. Resolve statuses, dates, and order indices
        let resolved = resolve_plan(&cmd.stages, today());

        // 3. Atomic replace; store errors abort the whole operation
        self.plan_store
            .replace_plan(&cmd.client_id, &resolved)
            .await?;

        // 4. Audit each completed stage; the sink swallows its own errors
        for stage in resolved.iter().filter(|s| s.status.is_completed()) {
            self.audit_sink
                .record(
                    &cmd.client_id,
                    &format!("Stage '{}' completed", stage.name),
                    cmd.actor_role,
                )
                .await;
        }

        // 5. Recompute progress outside the plan transaction
        let progress = match self.aggregator.handle(&cmd.client_id).await {
            Ok(progress) => Some(progress),
            Err(err) => {
                tracing::warn!(
                    client_id = %cmd.client_id,
                    error = %err,
                    "progress recomputation failed after plan replace"
                );
                None
            }
        };

        // 6. Optional plan summary to the primary contact
        if cmd.notify_contact {
            self.notify_contact(&cmd.client_id, &resolved).await;
        }

        Ok(ReplacePlanResult {
            stages: resolved,
            progress,
        })
    }

    async fn notify_contact(&self, client_id: &ClientId, stages: &[ResolvedStage]) {
        let contact = match self.recipient_resolver.resolve_client_contact(client_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                tracing::warn!(client_id = %client_id, "no contact on file, skipping plan summary");
                return;
            }
            Err(err) => {
                tracing::warn!(client_id = %client_id, error = %err, "contact lookup failed, skipping plan summary");
                return;
            }
        };

        if let Err(err) = self
            .notification_sender
            .send_plan_summary(client_id, &contact, stages)
            .await
        {
            tracing::warn!(client_id = %client_id, error = %err, "plan summary send failed");
        }
    }
}
