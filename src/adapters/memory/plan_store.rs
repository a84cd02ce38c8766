//! In-memory plan store for testing and development.
//!
//! Provides the same replace/load/update surface as the Postgres store
//! against a process-local map, plus failure injection and inspection
//! helpers for tests. Not suitable for production: nothing persists
//! across restarts and there is no cross-process visibility.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, ProgressStatus, StageId, SubtaskId,
};
use crate::domain::plan::{ClientSnapshot, ResolvedStage, Stage, StageWithSubtasks, Subtask};
use crate::ports::PlanStore;

/// In-memory implementation of PlanStore.
#[derive(Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<ClientId, Vec<StageWithSubtasks>>>,
    snapshots: RwLock<HashMap<ClientId, ClientSnapshot>>,
    fail_next_replace: AtomicBool,
    status_writes: AtomicUsize,
}

impl InMemoryPlanStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes the next `replace_plan` call fail, leaving the stored plan
    /// untouched (mimics a constraint violation mid-transaction).
    pub fn fail_next_replace(&self) {
        self.fail_next_replace.store(true, Ordering::SeqCst);
    }

    /// Returns the persisted snapshot for a client, if any.
    pub async fn snapshot(&self, client_id: &ClientId) -> Option<ClientSnapshot> {
        self.snapshots.read().await.get(client_id).copied()
    }

    /// Returns the persisted stage rows for a client.
    pub async fn stage_rows(&self, client_id: &ClientId) -> Vec<Stage> {
        self.plans
            .read()
            .await
            .get(client_id)
            .map(|plan| plan.iter().map(|e| e.stage.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of `persist_stage_statuses` calls observed.
    pub fn status_write_count(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    /// Overwrites one subtask's status in place, simulating an
    /// independent subtask update between recomputes.
    pub async fn set_subtask_status(
        &self,
        client_id: &ClientId,
        stage_index: usize,
        subtask_index: usize,
        status: ProgressStatus,
    ) {
        let mut plans = self.plans.write().await;
        let plan = plans.get_mut(client_id).expect("client has no plan");
        plan[stage_index].subtasks[subtask_index].status = status;
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn replace_plan(
        &self,
        client_id: &ClientId,
        stages: &[ResolvedStage],
    ) -> Result<(), DomainError> {
        if self.fail_next_replace.swap(false, Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Injected replace failure",
            ));
        }

        let materialized = stages
            .iter()
            .map(|stage| {
                let stage_id = StageId::new();
                StageWithSubtasks {
                    stage: Stage {
                        id: stage_id,
                        client_id: *client_id,
                        name: stage.name.clone(),
                        order_index: stage.order_index,
                        required: stage.required,
                        status: stage.status,
                        start_date: stage.start_date,
                        completion_date: stage.completion_date,
                        document_mode: stage.document_mode,
                    },
                    subtasks: stage
                        .subtasks
                        .iter()
                        .map(|subtask| Subtask {
                            id: SubtaskId::new(),
                            stage_id,
                            title: subtask.title.clone(),
                            status: subtask.status,
                            order_index: subtask.order_index,
                            due_date: subtask.due_date,
                            requires_document: subtask.requires_document,
                        })
                        .collect(),
                }
            })
            .collect();

        self.plans.write().await.insert(*client_id, materialized);
        Ok(())
    }

    async fn load_plan(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<StageWithSubtasks>, DomainError> {
        Ok(self
            .plans
            .read()
            .await
            .get(client_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn persist_stage_statuses(
        &self,
        updates: &[(StageId, ProgressStatus)],
    ) -> Result<(), DomainError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        let mut plans = self.plans.write().await;
        for plan in plans.values_mut() {
            for (id, status) in updates {
                if let Some(entry) = plan.iter_mut().find(|e| e.stage.id == *id) {
                    entry.stage.status = *status;
                }
            }
        }
        Ok(())
    }

    async fn update_client_snapshot(
        &self,
        client_id: &ClientId,
        snapshot: &ClientSnapshot,
    ) -> Result<(), DomainError> {
        self.snapshots.write().await.insert(*client_id, *snapshot);
        Ok(())
    }
}
