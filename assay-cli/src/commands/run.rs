//! Run command handlers
//!
//! Queueing, execution, resume, cancellation, and crash recovery.

use anyhow::{Result, bail};
use colored::*;

use assay_core::domain::project::Project;
use assay_core::domain::run::{Run, RunStatus};
use assay_engine::service::{execution_service, queue_service};

use super::CommandContext;
use crate::progress::ProgressPrinter;
use crate::resolver::{resolve_project, resolve_run};

/// Enqueue pipelines on an existing project
pub async fn add_pipeline(
    ctx: &CommandContext,
    reference: &str,
    pipelines: Vec<String>,
) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;

    for name in &pipelines {
        let run = queue_service::enqueue(&ctx.pool, &ctx.registry, &project, name).await?;
        println!(
            "{} Queued {} at position {}",
            "✓".green(),
            name.bold(),
            run.position
        );
    }

    Ok(())
}

/// Execute the project's queued runs in creation order
pub async fn execute(ctx: &CommandContext, reference: &str) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;
    println!(
        "{}",
        format!("Executing queued runs for {}:", project.name).bold()
    );
    drain(ctx, &project).await
}

/// Claim and execute runs until the queue halts; shared by `create --execute`
pub(super) async fn drain(ctx: &CommandContext, project: &Project) -> Result<()> {
    let finished = execution_service::execute_project(
        &ctx.pool,
        &ctx.registry,
        &ctx.config,
        project,
        &ProgressPrinter,
    )
    .await?;

    summarize(&finished)
}

/// Resume a failed run and continue draining the queue
pub async fn resume(ctx: &CommandContext, reference: &str, run_ref: Option<String>) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;

    let finished = match run_ref {
        Some(run_ref) => {
            let run = resolve_run(&ctx.pool, &project, &run_ref).await?;
            execution_service::resume_run(
                &ctx.pool,
                &ctx.registry,
                &ctx.config,
                &project,
                run.id,
                &ProgressPrinter,
            )
            .await?
        }
        None => {
            execution_service::resume_project(
                &ctx.pool,
                &ctx.registry,
                &ctx.config,
                &project,
                &ProgressPrinter,
            )
            .await?
        }
    };

    summarize(&finished)
}

/// Request boundary cancellation of the running run
pub async fn cancel(ctx: &CommandContext, reference: &str) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;
    let run = execution_service::cancel_project(&ctx.pool, &project).await?;

    println!(
        "{} Cancellation requested for run {}; honored at the next step boundary",
        "✓".green(),
        run.id.to_string().cyan()
    );

    Ok(())
}

/// Mark runs left `running` by a dead process as failed
pub async fn recover(ctx: &CommandContext, reference: &str) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;
    let recovered = execution_service::recover_project(&ctx.pool, &project).await?;

    for run in &recovered {
        println!(
            "{} Run {} ({}) marked as failed; resumable with 'assay resume'",
            "✓".green(),
            run.id.to_string().cyan(),
            run.pipeline.bold()
        );
    }

    Ok(())
}

/// Print per-run results; non-zero exit unless every run succeeded
fn summarize(finished: &[Run]) -> Result<()> {
    if finished.is_empty() {
        println!("{}", "Nothing to execute.".yellow());
        return Ok(());
    }

    println!();
    for run in finished {
        if run.status == RunStatus::Success {
            println!(
                "{} Run {} ({}) succeeded",
                "✓".green(),
                run.id.to_string().dimmed(),
                run.pipeline.bold()
            );
        } else {
            println!(
                "{} Run {} ({}) failed",
                "✗".red(),
                run.id.to_string().dimmed(),
                run.pipeline.bold()
            );
        }
    }

    if let Some(failed) = finished.iter().find(|r| r.status != RunStatus::Success) {
        bail!(
            "run {} ({}) did not succeed: {}",
            failed.id,
            failed.pipeline,
            failed.error_summary.as_deref().unwrap_or("no error summary")
        );
    }

    Ok(())
}
