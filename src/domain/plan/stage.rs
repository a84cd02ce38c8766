//! Stage entity - an ordered phase of a client's onboarding plan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ClientId, ProgressStatus, StageId};

use super::subtask::Subtask;

/// Document collection requirement for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentMode {
    #[default]
    NotRequired,
    Optional,
    Required,
}

impl fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentMode::NotRequired => "Not Required",
            DocumentMode::Optional => "Optional",
            DocumentMode::Required => "Required",
        };
        write!(f, "{}", s)
    }
}

/// A persisted stage row.
///
/// Stages are owned by the stage planner: they are created and destroyed
/// only as a unit with the client's whole plan, so this is a plain row
/// snapshot rather than an invariant-bearing aggregate. Order indices are
/// 1-based and dense within a client after every replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub client_id: ClientId,
    pub name: String,
    pub order_index: u32,
    pub required: bool,
    pub status: ProgressStatus,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub document_mode: DocumentMode,
}

/// A stage together with its subtasks, as loaded by the plan store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageWithSubtasks {
    pub stage: Stage,
    pub subtasks: Vec<Subtask>,
}

impl StageWithSubtasks {
    /// Returns the subtask statuses in order, for status derivation.
    pub fn subtask_statuses(&self) -> Vec<ProgressStatus> {
        self.subtasks.iter().map(|s| s.status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(status: ProgressStatus) -> Stage {
        Stage {
            id: StageId::new(),
            client_id: ClientId::new(),
            name: "KYC".to_string(),
            order_index: 1,
            required: true,
            status,
            start_date: None,
            completion_date: None,
            document_mode: DocumentMode::Required,
        }
    }

    #[test]
    fn document_mode_defaults_to_not_required() {
        assert_eq!(DocumentMode::default(), DocumentMode::NotRequired);
    }

    #[test]
    fn document_mode_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&DocumentMode::NotRequired).unwrap(),
            "\"not_required\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentMode::Required).unwrap(),
            "\"required\""
        );
    }

    #[test]
    fn subtask_statuses_preserves_order() {
        let s = stage(ProgressStatus::InProgress);
        let with_subtasks = StageWithSubtasks {
            subtasks: vec![
                Subtask {
                    id: crate::domain::foundation::SubtaskId::new(),
                    stage_id: s.id,
                    title: "Upload ID".to_string(),
                    status: ProgressStatus::Completed,
                    order_index: 1,
                    due_date: None,
                    requires_document: true,
                },
                Subtask {
                    id: crate::domain::foundation::SubtaskId::new(),
                    stage_id: s.id,
                    title: "Confirm address".to_string(),
                    status: ProgressStatus::NotStarted,
                    order_index: 2,
                    due_date: None,
                    requires_document: false,
                },
            ],
            stage: s,
        };

        assert_eq!(
            with_subtasks.subtask_statuses(),
            vec![ProgressStatus::Completed, ProgressStatus::NotStarted]
        );
    }
}
