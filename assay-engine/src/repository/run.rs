//! Run Repository
//!
//! Handles all database operations related to runs. Status transitions that
//! must be exclusive (claiming a run for execution) are expressed as
//! conditional UPDATEs so sqlite's single-writer semantics make them atomic
//! across concurrent front ends.

use assay_core::domain::run::{Run, RunStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a new run at the given queue position, status `not_started`
pub async fn create(
    pool: &SqlitePool,
    project_id: Uuid,
    pipeline: &str,
    position: i64,
) -> Result<Run, sqlx::Error> {
    let run = Run {
        id: Uuid::new_v4(),
        project_id,
        pipeline: pipeline.to_string(),
        status: RunStatus::NotStarted,
        position,
        attempt: 1,
        created_at: chrono::Utc::now(),
        started_at: None,
        ended_at: None,
        error_summary: None,
        cancel_requested: false,
    };

    sqlx::query(
        r#"
        INSERT INTO runs (id, project_id, pipeline, status, position, attempt, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(run.id.to_string())
    .bind(run.project_id.to_string())
    .bind(&run.pipeline)
    .bind(run.status.as_str())
    .bind(run.position)
    .bind(run.attempt)
    .bind(run.created_at)
    .execute(pool)
    .await?;

    Ok(run)
}

/// Find a run by ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Run>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(
        r#"
        SELECT id, project_id, pipeline, status, position, attempt,
               created_at, started_at, ended_at, error_summary, cancel_requested
        FROM runs
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List a project's runs in creation (position) order
pub async fn list_for_project(
    pool: &SqlitePool,
    project_id: Uuid,
) -> Result<Vec<Run>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RunRow>(
        r#"
        SELECT id, project_id, pipeline, status, position, attempt,
               created_at, started_at, ended_at, error_summary, cancel_requested
        FROM runs
        WHERE project_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Next free queue position for a project
pub async fn next_position(pool: &SqlitePool, project_id: Uuid) -> Result<i64, sqlx::Error> {
    let (position,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM runs WHERE project_id = ?",
    )
    .bind(project_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(position)
}

/// The project's currently running run, if any
pub async fn find_running(
    pool: &SqlitePool,
    project_id: Uuid,
) -> Result<Option<Run>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(
        r#"
        SELECT id, project_id, pipeline, status, position, attempt,
               created_at, started_at, ended_at, error_summary, cancel_requested
        FROM runs
        WHERE project_id = ? AND status = 'running'
        ORDER BY position ASC
        LIMIT 1
        "#,
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// The project's most recent failed run, if any
pub async fn find_latest_failure(
    pool: &SqlitePool,
    project_id: Uuid,
) -> Result<Option<Run>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(
        r#"
        SELECT id, project_id, pipeline, status, position, attempt,
               created_at, started_at, ended_at, error_summary, cancel_requested
        FROM runs
        WHERE project_id = ? AND status = 'failure'
        ORDER BY position DESC
        LIMIT 1
        "#,
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Mark a `not_started` run as selected by the queue controller
pub async fn mark_queued(pool: &SqlitePool, run_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE runs SET status = 'queued' WHERE id = ? AND status = 'not_started'")
        .bind(run_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Conditionally claim a queued run for execution
///
/// The transition to `running` happens only if no other run of the project
/// is currently running. Returns whether the claim succeeded.
pub async fn try_claim_queued(
    pool: &SqlitePool,
    run_id: Uuid,
    project_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE runs
        SET status = 'running', started_at = ?, cancel_requested = 0
        WHERE id = ? AND status = 'queued'
          AND NOT EXISTS (
              SELECT 1 FROM runs other
              WHERE other.project_id = ? AND other.status = 'running'
          )
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(run_id.to_string())
    .bind(project_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Conditionally claim a failed run for a resume attempt
///
/// Bumps the attempt counter and clears the prior failure bookkeeping; the
/// same no-other-running-run guard applies as for a fresh claim.
pub async fn try_claim_resume(
    pool: &SqlitePool,
    run_id: Uuid,
    project_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE runs
        SET status = 'running', attempt = attempt + 1, started_at = ?,
            ended_at = NULL, error_summary = NULL, cancel_requested = 0
        WHERE id = ? AND status = 'failure'
          AND NOT EXISTS (
              SELECT 1 FROM runs other
              WHERE other.project_id = ? AND other.status = 'running'
          )
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(run_id.to_string())
    .bind(project_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark a running run as successful
pub async fn mark_success(pool: &SqlitePool, run_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE runs SET status = 'success', ended_at = ? WHERE id = ? AND status = 'running'",
    )
    .bind(chrono::Utc::now())
    .bind(run_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a running run as failed with an error summary
pub async fn mark_failure(
    pool: &SqlitePool,
    run_id: Uuid,
    error_summary: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE runs
        SET status = 'failure', ended_at = ?, error_summary = ?
        WHERE id = ? AND status = 'running'
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(error_summary)
    .bind(run_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Request cancellation of a running run, honored at the next step boundary
pub async fn request_cancel(pool: &SqlitePool, run_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE runs SET cancel_requested = 1 WHERE id = ? AND status = 'running'")
        .bind(run_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RunRow {
    id: String,
    project_id: String,
    pipeline: String,
    status: String,
    position: i64,
    attempt: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    ended_at: Option<chrono::DateTime<chrono::Utc>>,
    error_summary: Option<String>,
    cancel_requested: bool,
}

impl From<RunRow> for Run {
    fn from(row: RunRow) -> Self {
        Run {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            project_id: Uuid::parse_str(&row.project_id).unwrap_or_default(),
            pipeline: row.pipeline,
            status: RunStatus::parse(&row.status).unwrap_or(RunStatus::NotStarted),
            position: row.position,
            attempt: row.attempt,
            created_at: row.created_at,
            started_at: row.started_at,
            ended_at: row.ended_at,
            error_summary: row.error_summary,
            cancel_requested: row.cancel_requested,
        }
    }
}
