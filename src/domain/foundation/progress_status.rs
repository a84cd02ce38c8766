//! ProgressStatus enum shared by subtasks, stages, and the client snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress tracking for a unit of onboarding work.
///
/// Subtask statuses are set by callers; stage statuses are always derived
/// from subtasks via [`ProgressStatus::derive_from_subtasks`]; the client's
/// overall status is computed by the progress aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Returns true if work has begun.
    pub fn is_started(&self) -> bool {
        !matches!(self, ProgressStatus::NotStarted)
    }

    /// Returns true if the work is finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }

    /// Derives a stage's status from its subtask statuses.
    ///
    /// A stage with no subtasks is `NotStarted`, never `Completed`. A stage
    /// whose (non-empty) subtask list is fully `Completed` is `Completed`.
    /// If any subtask has started the stage is `InProgress`; a stage whose
    /// subtasks are all `NotStarted` remains `NotStarted`.
    pub fn derive_from_subtasks(subtasks: &[ProgressStatus]) -> ProgressStatus {
        if subtasks.is_empty() {
            return ProgressStatus::NotStarted;
        }
        if subtasks.iter().all(|s| s.is_completed()) {
            return ProgressStatus::Completed;
        }
        if subtasks.iter().any(|s| s.is_started()) {
            ProgressStatus::InProgress
        } else {
            ProgressStatus::NotStarted
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}
