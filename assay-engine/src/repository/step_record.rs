//! Step Record Repository
//!
//! Handles all database operations related to step records. Records are
//! append-only: a `running` row is inserted when the driver reaches a step
//! and updated exactly once to its terminal status; terminal rows are never
//! modified or deleted, and resumed attempts append fresh rows under the new
//! attempt number.

use assay_core::domain::step::{StepRecord, StepStatus};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert a `running` record for the step the driver just reached
pub async fn insert_running(
    pool: &SqlitePool,
    run_id: Uuid,
    attempt: i64,
    step_index: i64,
    step_name: &str,
    started_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO step_records (run_id, attempt, step_index, step_name, status, started_at)
        VALUES (?, ?, ?, ?, 'running', ?)
        "#,
    )
    .bind(run_id.to_string())
    .bind(attempt)
    .bind(step_index)
    .bind(step_name)
    .bind(started_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Move a `running` record to its terminal status
pub async fn finish(
    pool: &SqlitePool,
    run_id: Uuid,
    attempt: i64,
    step_index: i64,
    status: StepStatus,
    ended_at: DateTime<Utc>,
    log: &str,
    failure_detail: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE step_records
        SET status = ?, ended_at = ?, log = ?, failure_detail = ?
        WHERE run_id = ? AND attempt = ? AND step_index = ? AND status = 'running'
        "#,
    )
    .bind(status.as_str())
    .bind(ended_at)
    .bind(log)
    .bind(failure_detail)
    .bind(run_id.to_string())
    .bind(attempt)
    .bind(step_index)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a `skipped` record carrying a prior attempt's success forward
///
/// The original timestamps and captured log are preserved so the history of
/// when the work actually happened survives resumes.
pub async fn insert_skipped(
    pool: &SqlitePool,
    run_id: Uuid,
    attempt: i64,
    step_index: i64,
    carried: &StepRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO step_records
            (run_id, attempt, step_index, step_name, status, started_at, ended_at, log)
        VALUES (?, ?, ?, ?, 'skipped', ?, ?, ?)
        "#,
    )
    .bind(run_id.to_string())
    .bind(attempt)
    .bind(step_index)
    .bind(&carried.step_name)
    .bind(carried.started_at)
    .bind(carried.ended_at)
    .bind(&carried.log)
    .execute(pool)
    .await?;

    Ok(())
}

/// Records of one attempt, in step order (the current view when the attempt
/// is the run's latest)
pub async fn list_for_attempt(
    pool: &SqlitePool,
    run_id: Uuid,
    attempt: i64,
) -> Result<Vec<StepRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StepRecordRow>(
        r#"
        SELECT run_id, attempt, step_index, step_name, status,
               started_at, ended_at, log, failure_detail
        FROM step_records
        WHERE run_id = ? AND attempt = ?
        ORDER BY step_index ASC
        "#,
    )
    .bind(run_id.to_string())
    .bind(attempt)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Full append-only history of a run, across all attempts
pub async fn list_all(pool: &SqlitePool, run_id: Uuid) -> Result<Vec<StepRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StepRecordRow>(
        r#"
        SELECT run_id, attempt, step_index, step_name, status,
               started_at, ended_at, log, failure_detail
        FROM step_records
        WHERE run_id = ?
        ORDER BY attempt ASC, step_index ASC
        "#,
    )
    .bind(run_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Mark a run's in-flight records as failed (crash recovery)
pub async fn mark_running_as_failed(
    pool: &SqlitePool,
    run_id: Uuid,
    failure_detail: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE step_records
        SET status = 'failure', ended_at = ?, failure_detail = ?
        WHERE run_id = ? AND status = 'running'
        "#,
    )
    .bind(Utc::now())
    .bind(failure_detail)
    .bind(run_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StepRecordRow {
    run_id: String,
    attempt: i64,
    step_index: i64,
    step_name: String,
    status: String,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    ended_at: Option<chrono::DateTime<chrono::Utc>>,
    log: String,
    failure_detail: Option<String>,
}

impl From<StepRecordRow> for StepRecord {
    fn from(row: StepRecordRow) -> Self {
        StepRecord {
            run_id: Uuid::parse_str(&row.run_id).unwrap_or_default(),
            attempt: row.attempt,
            step_index: row.step_index,
            step_name: row.step_name,
            status: StepStatus::parse(&row.status).unwrap_or(StepStatus::Pending),
            started_at: row.started_at,
            ended_at: row.ended_at,
            log: row.log,
            failure_detail: row.failure_detail,
        }
    }
}
