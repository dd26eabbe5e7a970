//! Execution service
//!
//! The run state machine driver. Claims runs through the queue controller,
//! executes their steps sequentially on a blocking worker, and persists
//! every transition so an interrupted process can resume where it stopped.
//!
//! Resume is an at-most-once guarantee per step: a step that reached
//! `success` in any prior attempt is never re-executed, only recorded as
//! `skipped` on the new attempt. Staleness of old outputs is accepted in
//! exchange for never silently duplicating side effects.

use std::collections::HashMap;

use assay_core::domain::project::Project;
use assay_core::domain::run::{Run, RunStatus};
use assay_core::domain::step::{StepRecord, StepStatus};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::executor::{self, StepOutcome};
use crate::registry::PipelineRegistry;
use crate::repository::{run_repository, step_record_repository};
use crate::service::queue_service;
use crate::workspace::Workspace;

/// Receives per-step progress events while a run executes
///
/// Front ends implement this to stream progress lines; the engine calls it
/// synchronously from the driver.
pub trait ExecutionObserver: Send + Sync {
    fn step_started(&self, run: &Run, step: &str) {
        let _ = (run, step);
    }

    fn step_completed(&self, run: &Run, step: &str, duration_secs: f64) {
        let _ = (run, step, duration_secs);
    }

    fn step_skipped(&self, run: &Run, step: &str) {
        let _ = (run, step);
    }

    fn step_failed(&self, run: &Run, step: &str, message: &str) {
        let _ = (run, step, message);
    }
}

/// Observer that discards all progress events
pub struct SilentObserver;

impl ExecutionObserver for SilentObserver {}

/// Start the next eligible queued run and drain the queue
///
/// Runs execute in strict creation order; each success advances to the next
/// queued run automatically, and a failure stops the drain. Fails with
/// `ConcurrentRun` if another run on the project is already running.
/// Returns the runs executed by this call, in execution order.
pub async fn execute_project(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    config: &EngineConfig,
    project: &Project,
    observer: &dyn ExecutionObserver,
) -> Result<Vec<Run>> {
    if run_repository::find_running(pool, project.id).await?.is_some() {
        return Err(EngineError::ConcurrentRun(project.name.clone()));
    }

    let mut finished = Vec::new();
    while let Some(run) = queue_service::advance(pool, project.id).await? {
        let run = drive(pool, registry, config, project, run, observer).await?;
        let succeeded = run.status == RunStatus::Success;
        finished.push(run);
        if !succeeded {
            break;
        }
    }

    Ok(finished)
}

/// Resume the project's most recent failed run, then drain the queue
pub async fn resume_project(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    config: &EngineConfig,
    project: &Project,
    observer: &dyn ExecutionObserver,
) -> Result<Vec<Run>> {
    let failed = run_repository::find_latest_failure(pool, project.id)
        .await?
        .ok_or_else(|| EngineError::NothingToResume(project.name.clone()))?;

    resume_claimed(pool, registry, config, project, failed.id, observer).await
}

/// Resume one specific failed run, then drain the queue
pub async fn resume_run(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    config: &EngineConfig,
    project: &Project,
    run_id: Uuid,
    observer: &dyn ExecutionObserver,
) -> Result<Vec<Run>> {
    let run = run_repository::find_by_id(pool, run_id)
        .await?
        .filter(|r| r.project_id == project.id)
        .ok_or(EngineError::RunNotFound(run_id))?;

    if !run.is_resumable() {
        return Err(EngineError::NotResumable {
            run: run_id,
            status: run.status,
        });
    }

    resume_claimed(pool, registry, config, project, run_id, observer).await
}

async fn resume_claimed(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    config: &EngineConfig,
    project: &Project,
    run_id: Uuid,
    observer: &dyn ExecutionObserver,
) -> Result<Vec<Run>> {
    if !run_repository::try_claim_resume(pool, run_id, project.id).await? {
        return Err(EngineError::ConcurrentRun(project.name.clone()));
    }

    let run = refreshed(pool, run_id).await?;
    tracing::info!(
        "Resuming run {} on project {} (attempt {})",
        run.id,
        project.name,
        run.attempt
    );

    let run = drive(pool, registry, config, project, run, observer).await?;
    let succeeded = run.status == RunStatus::Success;
    let mut finished = vec![run];

    if succeeded {
        while let Some(next) = queue_service::advance(pool, project.id).await? {
            let next = drive(pool, registry, config, project, next, observer).await?;
            let succeeded = next.status == RunStatus::Success;
            finished.push(next);
            if !succeeded {
                break;
            }
        }
    }

    Ok(finished)
}

/// Request cancellation of the running run; honored at the next step
/// boundary
pub async fn cancel_project(pool: &SqlitePool, project: &Project) -> Result<Run> {
    let running = run_repository::find_running(pool, project.id)
        .await?
        .ok_or_else(|| EngineError::NothingToCancel(project.name.clone()))?;

    run_repository::request_cancel(pool, running.id).await?;
    refreshed(pool, running.id).await
}

/// Mark runs left in `running` by a dead process as failed ("interrupted")
///
/// Not invoked automatically at startup: a front-end process cannot tell a
/// crashed run from one live in another process, so recovery is an explicit
/// operator action. Recovered runs are resumable.
pub async fn recover_project(pool: &SqlitePool, project: &Project) -> Result<Vec<Run>> {
    let stuck: Vec<Run> = run_repository::list_for_project(pool, project.id)
        .await?
        .into_iter()
        .filter(|r| r.status == RunStatus::Running)
        .collect();

    if stuck.is_empty() {
        return Err(EngineError::NothingToRecover(project.name.clone()));
    }

    let mut recovered = Vec::with_capacity(stuck.len());
    for run in stuck {
        step_record_repository::mark_running_as_failed(pool, run.id, "interrupted").await?;
        run_repository::mark_failure(pool, run.id, "interrupted").await?;
        tracing::warn!("Recovered interrupted run {} on project {}", run.id, project.name);
        recovered.push(refreshed(pool, run.id).await?);
    }

    Ok(recovered)
}

/// Execute a claimed (`running`) run to a terminal status
///
/// For each step in definition order: skip if a prior attempt already
/// satisfied it, honor cancellation and the per-run timeout at the boundary,
/// then execute on a blocking worker and record the outcome. The run always
/// reaches `success` or `failure`; step-level failures never escape this
/// function as errors.
pub async fn drive(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    config: &EngineConfig,
    project: &Project,
    run: Run,
    observer: &dyn ExecutionObserver,
) -> Result<Run> {
    let definition = match registry.resolve(&run.pipeline) {
        Ok(definition) => definition.clone(),
        Err(err) => {
            run_repository::mark_failure(pool, run.id, &err.to_string()).await?;
            return refreshed(pool, run.id).await;
        }
    };

    let workspace = match Workspace::open(&project.work_dir) {
        Ok(workspace) => workspace,
        Err(err) => {
            let summary = format!("workspace unavailable: {}", err);
            run_repository::mark_failure(pool, run.id, &summary).await?;
            return refreshed(pool, run.id).await;
        }
    };

    // latest record per step index from prior attempts; a step whose latest
    // record is success (or skipped carrying an earlier success) is not
    // re-executed
    let mut satisfied: HashMap<i64, StepRecord> = HashMap::new();
    for record in step_record_repository::list_all(pool, run.id).await? {
        if record.attempt < run.attempt {
            satisfied.insert(record.step_index, record);
        }
    }

    let attempt_started = run.started_at.unwrap_or_else(Utc::now);

    for (index, step_name) in definition.steps.iter().enumerate() {
        let index = index as i64;

        if let Some(prior) = satisfied.get(&index)
            && prior.step_name == *step_name
            && prior.status.satisfies_resume()
        {
            step_record_repository::insert_skipped(pool, run.id, run.attempt, index, prior)
                .await?;
            observer.step_skipped(&run, step_name);
            continue;
        }

        // cancellation and timeout are honored only at step boundaries
        let fresh = refreshed(pool, run.id).await?;
        if fresh.cancel_requested {
            let summary = format!("cancelled before step '{}'", step_name);
            run_repository::mark_failure(pool, run.id, &summary).await?;
            tracing::info!("Run {} cancelled before step '{}'", run.id, step_name);
            return refreshed(pool, run.id).await;
        }

        if let Some(timeout) = config.run_timeout {
            let elapsed = Utc::now().signed_duration_since(attempt_started);
            if elapsed.to_std().map(|e| e >= timeout).unwrap_or(false) {
                let summary = format!(
                    "run timed out after {}s before step '{}'",
                    elapsed.num_seconds(),
                    step_name
                );
                run_repository::mark_failure(pool, run.id, &summary).await?;
                return refreshed(pool, run.id).await;
            }
        }

        step_record_repository::insert_running(
            pool,
            run.id,
            run.attempt,
            index,
            step_name,
            Utc::now(),
        )
        .await?;
        observer.step_started(&run, step_name);

        let outcome = match registry.steps().get(step_name) {
            Some(step) => {
                // steps may block for arbitrarily long; keep them off the
                // async runtime
                let step_workspace = workspace.clone();
                match tokio::task::spawn_blocking(move || {
                    executor::execute(step.as_ref(), &step_workspace)
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(err) => StepOutcome::aborted(format!("step worker lost: {}", err)),
                }
            }
            // registration validates step names; only a registry that
            // diverged from the stored pipeline can get here
            None => StepOutcome::aborted(format!("step '{}' is not registered", step_name)),
        };

        let detail = outcome.failure_detail();
        step_record_repository::finish(
            pool,
            run.id,
            run.attempt,
            index,
            outcome.status,
            outcome.ended_at,
            &outcome.log,
            detail.as_deref(),
        )
        .await?;

        if outcome.status == StepStatus::Failure {
            let message = outcome
                .failure
                .as_ref()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| "unknown failure".to_string());
            observer.step_failed(&run, step_name, &message);

            let summary = format!("step '{}' failed: {}", step_name, message);
            run_repository::mark_failure(pool, run.id, &summary).await?;
            tracing::warn!("Run {} failed: {}", run.id, summary);
            return refreshed(pool, run.id).await;
        }

        observer.step_completed(&run, step_name, outcome.duration_secs());
    }

    run_repository::mark_success(pool, run.id).await?;
    tracing::info!("Run {} completed successfully", run.id);

    // scratch space is purged only on success; a purge failure is logged
    // and does not alter the run's status
    if let Err(err) = workspace.purge_tmp() {
        tracing::warn!(
            "Failed to purge tmp for project {}: {}",
            project.name,
            err
        );
    }

    refreshed(pool, run.id).await
}

async fn refreshed(pool: &SqlitePool, run_id: Uuid) -> Result<Run> {
    run_repository::find_by_id(pool, run_id)
        .await?
        .ok_or(EngineError::RunNotFound(run_id))
}
