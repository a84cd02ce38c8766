//! PostgreSQL implementation of PlanStore.
//!
//! The plan replace is a full delete-then-reinsert inside one
//! transaction, with UNNEST bulk inserts so the transaction stays short
//! regardless of plan size.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, ProgressStatus, StageId, SubtaskId,
};
use crate::domain::plan::{
    ClientSnapshot, DocumentMode, ResolvedStage, Stage, StageWithSubtasks, Subtask,
};
use crate::ports::PlanStore;

/// PostgreSQL implementation of PlanStore.
#[derive(Clone)]
pub struct PostgresPlanStore {
    pool: PgPool,
}

impl PostgresPlanStore {
    /// Creates a new PostgresPlanStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PostgresPlanStore {
    async fn replace_plan(
        &self,
        client_id: &ClientId,
        stages: &[ResolvedStage],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::database(format!("Failed to begin transaction: {}", e))
        })?;

        // Full replace: subtasks first, then stages
        sqlx::query(
            "DELETE FROM subtasks WHERE stage_id IN (SELECT id FROM stages WHERE client_id = $1)",
        )
        .bind(client_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to delete subtasks: {}", e)))?;

        sqlx::query("DELETE FROM stages WHERE client_id = $1")
            .bind(client_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete stages: {}", e)))?;

        // Bulk insert the new plan
        let mut stage_ids: Vec<Uuid> = Vec::with_capacity(stages.len());
        let mut names: Vec<String> = Vec::with_capacity(stages.len());
        let mut order_indices: Vec<i32> = Vec::with_capacity(stages.len());
        let mut required_flags: Vec<bool> = Vec::with_capacity(stages.len());
        let mut statuses: Vec<String> = Vec::with_capacity(stages.len());
        let mut start_dates: Vec<Option<NaiveDate>> = Vec::with_capacity(stages.len());
        let mut completion_dates: Vec<Option<NaiveDate>> = Vec::with_capacity(stages.len());
        let mut document_modes: Vec<String> = Vec::with_capacity(stages.len());

        let mut subtask_stage_ids: Vec<Uuid> = Vec::new();
        let mut subtask_ids: Vec<Uuid> = Vec::new();
        let mut subtask_titles: Vec<String> = Vec::new();
        let mut subtask_statuses: Vec<String> = Vec::new();
        let mut subtask_indices: Vec<i32> = Vec::new();
        let mut subtask_due_dates: Vec<Option<NaiveDate>> = Vec::new();
        let mut subtask_doc_flags: Vec<bool> = Vec::new();

        for stage in stages {
            let stage_id = Uuid::new_v4();
            stage_ids.push(stage_id);
            names.push(stage.name.clone());
            order_indices.push(stage.order_index as i32);
            required_flags.push(stage.required);
            statuses.push(progress_status_to_str(stage.status).to_string());
            start_dates.push(stage.start_date);
            completion_dates.push(stage.completion_date);
            document_modes.push(document_mode_to_str(stage.document_mode).to_string());

            for subtask in &stage.subtasks {
                subtask_stage_ids.push(stage_id);
                subtask_ids.push(Uuid::new_v4());
                subtask_titles.push(subtask.title.clone());
                subtask_statuses.push(progress_status_to_str(subtask.status).to_string());
                subtask_indices.push(subtask.order_index as i32);
                subtask_due_dates.push(subtask.due_date);
                subtask_doc_flags.push(subtask.requires_document);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO stages (
                id, client_id, name, order_index, required, status,
                start_date, completion_date, document_mode
            )
            SELECT u.id, $1, u.name, u.order_index, u.required, u.status,
                   u.start_date, u.completion_date, u.document_mode
            FROM UNNEST(
                $2::uuid[], $3::text[], $4::int4[], $5::bool[], $6::text[],
                $7::date[], $8::date[], $9::text[]
            ) AS u(id, name, order_index, required, status,
                   start_date, completion_date, document_mode)
            "#,
        )
        .bind(client_id.as_uuid())
        .bind(&stage_ids)
        .bind(&names)
        .bind(&order_indices)
        .bind(&required_flags)
        .bind(&statuses)
        .bind(&start_dates)
        .bind(&completion_dates)
        .bind(&document_modes)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert stages: {}", e)))?;

        if !subtask_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO subtasks (
                    id, stage_id, title, status, order_index, due_date, requires_document
                )
                SELECT u.id, u.stage_id, u.title, u.status, u.order_index,
                       u.due_date, u.requires_document
                FROM UNNEST(
                    $1::uuid[], $2::uuid[], $3::text[], $4::text[], $5::int4[],
                    $6::date[], $7::bool[]
                ) AS u(id, stage_id, title, status, order_index, due_date, requires_document)
                "#,
            )
            .bind(&subtask_ids)
            .bind(&subtask_stage_ids)
            .bind(&subtask_titles)
            .bind(&subtask_statuses)
            .bind(&subtask_indices)
            .bind(&subtask_due_dates)
            .bind(&subtask_doc_flags)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to insert subtasks: {}", e)))?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(())
    }

    async fn load_plan(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<StageWithSubtasks>, DomainError> {
        let stage_rows = sqlx::query(
            r#"
            SELECT id, client_id, name, order_index, required, status,
                   start_date, completion_date, document_mode
            FROM stages
            WHERE client_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch stages: {}", e)))?;

        let mut stages = Vec::with_capacity(stage_rows.len());
        for row in stage_rows {
            stages.push(row_to_stage(row)?);
        }

        let stage_ids: Vec<Uuid> = stages.iter().map(|s| *s.id.as_uuid()).collect();
        let subtask_rows = sqlx::query(
            r#"
            SELECT id, stage_id, title, status, order_index, due_date, requires_document
            FROM subtasks
            WHERE stage_id = ANY($1)
            ORDER BY stage_id, order_index
            "#,
        )
        .bind(&stage_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch subtasks: {}", e)))?;

        let mut subtasks: Vec<Subtask> = Vec::with_capacity(subtask_rows.len());
        for row in subtask_rows {
            subtasks.push(row_to_subtask(row)?);
        }

        Ok(stages
            .into_iter()
            .map(|stage| {
                let stage_subtasks = subtasks
                    .iter()
                    .filter(|s| s.stage_id == stage.id)
                    .cloned()
                    .collect();
                StageWithSubtasks {
                    stage,
                    subtasks: stage_subtasks,
                }
            })
            .collect())
    }

    async fn persist_stage_statuses(
        &self,
        updates: &[(StageId, ProgressStatus)],
    ) -> Result<(), DomainError> {
        if updates.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = updates.iter().map(|(id, _)| *id.as_uuid()).collect();
        let statuses: Vec<String> = updates
            .iter()
            .map(|(_, status)| progress_status_to_str(*status).to_string())
            .collect();

        sqlx::query(
            r#"
            UPDATE stages SET status = u.status
            FROM UNNEST($1::uuid[], $2::text[]) AS u(id, status)
            WHERE stages.id = u.id
            "#,
        )
        .bind(&ids)
        .bind(&statuses)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update stage statuses: {}", e)))?;

        Ok(())
    }

    async fn update_client_snapshot(
        &self,
        client_id: &ClientId,
        snapshot: &ClientSnapshot,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE clients SET
                progress = $2,
                current_stage_id = $3,
                status = $4
            WHERE id = $1
            "#,
        )
        .bind(client_id.as_uuid())
        .bind(snapshot.progress.value() as i32)
        .bind(snapshot.current_stage.map(|id| *id.as_uuid()))
        .bind(progress_status_to_str(snapshot.status))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update client snapshot: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ClientNotFound,
                format!("Client not found: {}", client_id),
            ));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Row Mapping
// ════════════════════════════════════════════════════════════════════════════════

fn row_to_stage(row: sqlx::postgres::PgRow) -> Result<Stage, DomainError> {
    let id: Uuid = row.get("id");
    let client_id: Uuid = row.get("client_id");
    let order_index: i32 = row.get("order_index");
    let status: String = row.get("status");
    let document_mode: String = row.get("document_mode");

    Ok(Stage {
        id: StageId::from_uuid(id),
        client_id: ClientId::from_uuid(client_id),
        name: row.get("name"),
        order_index: order_index as u32,
        required: row.get("required"),
        status: str_to_progress_status(&status)?,
        start_date: row.get("start_date"),
        completion_date: row.get("completion_date"),
        document_mode: str_to_document_mode(&document_mode)?,
    })
}

fn row_to_subtask(row: sqlx::postgres::PgRow) -> Result<Subtask, DomainError> {
    let id: Uuid = row.get("id");
    let stage_id: Uuid = row.get("stage_id");
    let order_index: i32 = row.get("order_index");
    let status: String = row.get("status");

    Ok(Subtask {
        id: SubtaskId::from_uuid(id),
        stage_id: StageId::from_uuid(stage_id),
        title: row.get("title"),
        status: str_to_progress_status(&status)?,
        order_index: order_index as u32,
        due_date: row.get("due_date"),
        requires_document: row.get("requires_document"),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Type Conversions
// ════════════════════════════════════════════════════════════════════════════════

fn progress_status_to_str(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "not_started",
        ProgressStatus::InProgress => "in_progress",
        ProgressStatus::Completed => "completed",
    }
}

fn str_to_progress_status(s: &str) -> Result<ProgressStatus, DomainError> {
    match s {
        "not_started" => Ok(ProgressStatus::NotStarted),
        "in_progress" => Ok(ProgressStatus::InProgress),
        "completed" => Ok(ProgressStatus::Completed),
        _ => Err(DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid progress status: {}", s),
        )),
    }
}

fn document_mode_to_str(mode: DocumentMode) -> &'static str {
    match mode {
        DocumentMode::NotRequired => "not_required",
        DocumentMode::Optional => "optional",
        DocumentMode::Required => "required",
    }
}

fn str_to_document_mode(s: &str) -> Result<DocumentMode, DomainError> {
    match s {
        "not_required" => Ok(DocumentMode::NotRequired),
        "optional" => Ok(DocumentMode::Optional),
        "required" => Ok(DocumentMode::Required),
        _ => Err(DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid document mode: {}", s),
        )),
    }
}
