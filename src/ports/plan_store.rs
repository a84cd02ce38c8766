//! Plan store port.
//!
//! Defines the contract for persisting and retrieving a client's stage
//! plan and progress snapshot. Implementations own the transactional
//! behavior: `replace_plan` must be atomic at single-client-plan
//! granularity.

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError, ProgressStatus, StageId};
use crate::domain::plan::{ClientSnapshot, ResolvedStage, StageWithSubtasks};

/// Transactional store for stage plans.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Atomically replaces the client's entire plan.
    ///
    /// Deletes every existing subtask and stage for the client, then
    /// inserts the resolved plan, all in one transaction. On failure the
    /// prior plan must remain intact and readable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on constraint violation or connectivity loss;
    ///   the whole replace is rolled back
    async fn replace_plan(
        &self,
        client_id: &ClientId,
        stages: &[ResolvedStage],
    ) -> Result<(), DomainError>;

    /// Loads the client's stages ordered by order index, each with its
    /// subtasks ordered within the stage.
    ///
    /// A client without a plan yields an empty vector, not an error.
    async fn load_plan(&self, client_id: &ClientId) -> Result<Vec<StageWithSubtasks>, DomainError>;

    /// Persists recomputed stage statuses.
    ///
    /// Callers pass only the stages whose status actually changed.
    async fn persist_stage_statuses(
        &self,
        updates: &[(StageId, ProgressStatus)],
    ) -> Result<(), DomainError>;

    /// Persists the progress snapshot onto the client record in one
    /// update.
    ///
    /// # Errors
    ///
    /// - `ClientNotFound` if the client row does not exist
    /// - `DatabaseError` on persistence failure
    async fn update_client_snapshot(
        &self,
        client_id: &ClientId,
        snapshot: &ClientSnapshot,
    ) -> Result<(), DomainError>;
}
