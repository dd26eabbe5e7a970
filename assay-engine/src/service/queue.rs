//! Pipeline Queue Controller
//!
//! Orders the runs attached to one project and advances them strictly in
//! creation order. A failed run is a hard stop for automatic progression:
//! the queue halts until an operator resumes it, so no later pipeline
//! executes over a project assumed to be broken.

use assay_core::domain::project::Project;
use assay_core::domain::run::{Run, RunStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::registry::PipelineRegistry;
use crate::repository::run_repository;

/// Append a new `not_started` run for a named pipeline
///
/// The pipeline name is validated against the registry, so an unknown name
/// is rejected at enqueue time rather than when the run would start.
pub async fn enqueue(
    pool: &SqlitePool,
    registry: &PipelineRegistry,
    project: &Project,
    pipeline_name: &str,
) -> Result<Run> {
    registry.resolve(pipeline_name)?;

    let position = run_repository::next_position(pool, project.id).await?;
    let run = run_repository::create(pool, project.id, pipeline_name, position).await?;

    tracing::info!(
        "Enqueued pipeline '{}' as run {} (position {}) on project {}",
        pipeline_name,
        run.id,
        position,
        project.name
    );

    Ok(run)
}

/// Claim the next eligible run in creation order, if the queue may progress
///
/// Walks the project's runs by position: completed runs are passed over, a
/// running run means nothing to do, and a failed run halts the walk. The
/// first `not_started`/`queued` run is claimed through the conditional
/// UPDATE, so a concurrent front end racing this call cannot produce two
/// running runs. Returns the claimed run, or `None` if the queue cannot
/// advance.
pub async fn advance(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Run>> {
    let runs = run_repository::list_for_project(pool, project_id).await?;

    for run in runs {
        match run.status {
            RunStatus::Success => continue,
            RunStatus::Running | RunStatus::Failure => return Ok(None),
            RunStatus::NotStarted | RunStatus::Queued => {
                if run.status == RunStatus::NotStarted {
                    run_repository::mark_queued(pool, run.id).await?;
                }
                if !run_repository::try_claim_queued(pool, run.id, project_id).await? {
                    // lost the claim to a concurrent caller
                    return Ok(None);
                }
                return Ok(run_repository::find_by_id(pool, run.id).await?);
            }
        }
    }

    Ok(None)
}
