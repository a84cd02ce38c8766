//! Subtask entity - a unit of work within a stage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProgressStatus, StageId, SubtaskId};

/// A persisted subtask row.
///
/// Subtask status is the only independently-set status in the plan; the
/// owning stage's status is always derived from its subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub stage_id: StageId,
    pub title: String,
    pub status: ProgressStatus,
    pub order_index: u32,
    pub due_date: Option<NaiveDate>,
    pub requires_document: bool,
}
