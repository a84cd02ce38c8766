//! Pure plan resolution.
//!
//! Turns the caller-submitted stage drafts into a fully resolved plan:
//! derived stage statuses, chained start dates, and dense 1-based order
//! indices. No I/O happens here; the plan store persists the result in a
//! single transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProgressStatus, ValidationError};

use super::stage::DocumentMode;

/// Caller-submitted subtask within a stage draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskDraft {
    pub title: String,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub requires_document: bool,
}

/// Caller-submitted stage. Callers submit the complete desired plan on
/// every replace; there is no partial/diff update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDraft {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub document_mode: DocumentMode,
    #[serde(default)]
    pub subtasks: Vec<SubtaskDraft>,
}

/// A subtask ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSubtask {
    pub title: String,
    pub status: ProgressStatus,
    pub order_index: u32,
    pub due_date: Option<NaiveDate>,
    pub requires_document: bool,
}

/// A stage ready for insertion, with derived status and resolved dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStage {
    pub name: String,
    pub required: bool,
    pub order_index: u32,
    pub status: ProgressStatus,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub document_mode: DocumentMode,
    pub subtasks: Vec<ResolvedSubtask>,
}

/// Validates drafts before any store access.
///
/// # Errors
///
/// - `EmptyPlan` when no stages are submitted
/// - `EmptyField` for blank stage names or subtask titles
pub fn validate_drafts(drafts: &[StageDraft]) -> Result<(), ValidationError> {
    if drafts.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }
    for draft in drafts {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::empty_field("stage name"));
        }
        for subtask in &draft.subtasks {
            if subtask.title.trim().is_empty() {
                return Err(ValidationError::empty_field("subtask title"));
            }
        }
    }
    Ok(())
}

/// Resolves a submitted plan against a reference date.
///
/// For each stage, in submitted order:
/// - status is derived from its subtasks
///   ([`ProgressStatus::derive_from_subtasks`]);
/// - the start date is the explicit draft date, else the previous stage's
///   resolved completion date, else `today` when the stage has started,
///   else none; omitted dates therefore chain into a monotonically
///   advancing timeline;
/// - the completion date is the draft date or `today` iff the derived
///   status is `Completed`;
/// - order indices are assigned 1..N (and 1..M for subtasks).
pub fn resolve_plan(drafts: &[StageDraft], today: NaiveDate) -> Vec<ResolvedStage> {
    let mut resolved = Vec::with_capacity(drafts.len());
    let mut prev_completion: Option<NaiveDate> = None;

    for (position, draft) in drafts.iter().enumerate() {
        let statuses: Vec<ProgressStatus> = draft.subtasks.iter().map(|s| s.status).collect();
        let status = ProgressStatus::derive_from_subtasks(&statuses);

        let start_date = draft
            .start_date
            .or(prev_completion)
            .or(if status.is_started() { Some(today) } else { None });

        let completion_date = if status.is_completed() {
            Some(draft.completion_date.unwrap_or(today))
        } else {
            None
        };

        prev_completion = completion_date;

        let subtasks = draft
            .subtasks
            .iter()
            .enumerate()
            .map(|(i, s)| ResolvedSubtask {
                title: s.title.clone(),
                status: s.status,
                order_index: (i + 1) as u32,
                due_date: s.due_date,
                requires_document: s.requires_document,
            })
            .collect();

        resolved.push(ResolvedStage {
            name: draft.name.clone(),
            required: draft.required,
            order_index: (position + 1) as u32,
            status,
            start_date,
            completion_date,
            document_mode: draft.document_mode,
            subtasks,
        });
    }

    resolved
}
