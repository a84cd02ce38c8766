//! PlanProgress value object - stage-based progress for a client's plan.
//!
//! Provides the canonical progress view: completed-stage ratio, the
//! pointer to the next actionable stage, and the snapshot persisted onto
//! the client record.

use serde::Serialize;

use crate::domain::foundation::{Percentage, ProgressStatus, StageId};

use super::stage::Stage;

/// A snapshot of plan progress across all stages.
///
/// Read-only value object computed from an ordered stage list; two
/// computations over the same stages are always identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanProgress {
    completed: usize,
    total: usize,
    percent: Percentage,
    next_stage: Option<StageId>,
}

/// The fields persisted onto the client record in one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientSnapshot {
    pub progress: Percentage,
    pub current_stage: Option<StageId>,
    pub status: ProgressStatus,
}

impl PlanProgress {
    /// Computes progress from stages ordered by order index.
    ///
    /// Zero stages yield zero percent and no next stage.
    pub fn compute(stages: &[Stage]) -> Self {
        let total = stages.len();
        let completed = stages.iter().filter(|s| s.status.is_completed()).count();
        let next_stage = stages
            .iter()
            .find(|s| !s.status.is_completed())
            .map(|s| s.id);

        Self {
            completed,
            total,
            percent: Percentage::from_ratio(completed, total),
            next_stage,
        }
    }

    /// Returns the number of completed stages.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Returns the total number of stages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the completion percentage (0-100, rounded).
    pub fn percent(&self) -> Percentage {
        self.percent
    }

    /// Returns the first stage (in order) that is not completed.
    pub fn next_stage(&self) -> Option<StageId> {
        self.next_stage
    }

    /// Returns the overall client status: `Completed` at exactly 100
    /// percent, `InProgress` otherwise.
    pub fn overall_status(&self) -> ProgressStatus {
        if self.percent.is_full() {
            ProgressStatus::Completed
        } else {
            ProgressStatus::InProgress
        }
    }

    /// Returns the snapshot to persist onto the client record.
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            progress: self.percent,
            current_stage: self.next_stage,
            status: self.overall_status(),
        }
    }
}
