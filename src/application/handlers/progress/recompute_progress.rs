//! RecomputeProgressHandler - recomputes a client's stage-based progress.
//!
//! Stage statuses are re-derived from subtasks on every recompute so the
//! persisted plan stays consistent when subtask statuses change after the
//! plan was created. Recompute is idempotent: with no intervening writes,
//! a second call returns the same result and persists nothing.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, DomainError, ProgressStatus, StageId};
use crate::domain::plan::PlanProgress;
use crate::ports::PlanStore;

/// Error type for progress recomputation.
#[derive(Debug, Clone)]
pub enum RecomputeProgressError {
    /// Store failure while loading or persisting.
    Store(DomainError),
}

impl std::fmt::Display for RecomputeProgressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecomputeProgressError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RecomputeProgressError {}

impl From<DomainError> for RecomputeProgressError {
    fn from(err: DomainError) -> Self {
        RecomputeProgressError::Store(err)
    }
}

/// Handler for the stage-based progress view.
///
/// The surrounding portal historically also carried a task-completion
/// ratio; the stage ratio computed here is the canonical one and the only
/// number persisted onto the client record.
pub struct RecomputeProgressHandler {
    plan_store: Arc<dyn PlanStore>,
}

impl RecomputeProgressHandler {
    pub fn new(plan_store: Arc<dyn PlanStore>) -> Self {
        Self { plan_store }
    }

    pub async fn handle(
        &self,
        client_id: &ClientId,
    ) -> Result<PlanProgress, RecomputeProgressError> {
        // 1. Load the plan, ordered by order index
        let plan = self.plan_store.load_plan(client_id).await?;

        // 2. Re-derive stage statuses from subtasks; persist only changes
        let mut changed: Vec<(StageId, ProgressStatus)> = Vec::new();
        let mut stages = Vec::with_capacity(plan.len());
        for entry in plan {
            let derived = ProgressStatus::derive_from_subtasks(&entry.subtask_statuses());
            let mut stage = entry.stage;
            if derived != stage.status {
                changed.push((stage.id, derived));
                stage.status = derived;
            }
            stages.push(stage);
        }
        if !changed.is_empty() {
            self.plan_store.persist_stage_statuses(&changed).await?;
        }

        // 3-5. Compute and persist the snapshot in one update
        let progress = PlanProgress::compute(&stages);
        self.plan_store
            .update_client_snapshot(client_id, &progress.snapshot())
            .await?;

        Ok(progress)
    }
}
