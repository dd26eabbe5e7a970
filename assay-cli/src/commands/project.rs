//! Project command handlers
//!
//! Creation, input staging, listing, status, and output rendering.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use assay_core::domain::run::RunStatus;
use assay_core::domain::step::StepStatus;
use assay_core::dto::report::RunReport;
use assay_engine::service::{project_service, queue_service};

use super::{CommandContext, OutputFormat};
use crate::resolver::resolve_project;

/// Create a project, optionally staging inputs, queueing pipelines, and
/// executing immediately
pub async fn create(
    ctx: &CommandContext,
    name: &str,
    pipelines: Vec<String>,
    inputs: Vec<PathBuf>,
    execute: bool,
) -> Result<()> {
    let project = project_service::create_project(&ctx.pool, &ctx.config, name).await?;

    println!("{}", "✓ Project created".green().bold());
    println!("  ID:        {}", project.id.to_string().cyan());
    println!("  Name:      {}", project.name.bold());
    println!(
        "  Workspace: {}",
        project.work_dir.display().to_string().dimmed()
    );

    for input in &inputs {
        let dest = project_service::add_input(&project, input)
            .await
            .with_context(|| format!("Failed to add input {}", input.display()))?;
        println!("  Input:     {}", dest.display().to_string().dimmed());
    }

    for pipeline in &pipelines {
        let run = queue_service::enqueue(&ctx.pool, &ctx.registry, &project, pipeline).await?;
        println!("  Queued:    {} (position {})", pipeline.bold(), run.position);
    }

    if execute {
        println!();
        super::run::drain(ctx, &project).await?;
    }

    Ok(())
}

/// Copy files into an existing project's input directory
pub async fn add_input(ctx: &CommandContext, reference: &str, inputs: Vec<PathBuf>) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;

    for input in &inputs {
        let dest = project_service::add_input(&project, input)
            .await
            .with_context(|| format!("Failed to add input {}", input.display()))?;
        println!("{} Added {}", "✓".green(), dest.display().to_string().dimmed());
    }

    Ok(())
}

/// List all projects
pub async fn list(ctx: &CommandContext) -> Result<()> {
    let projects = project_service::list_projects(&ctx.pool).await?;

    if projects.is_empty() {
        println!("{}", "No projects found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} project(s):", projects.len()).bold());
    println!();
    for project in projects {
        println!("  {} {}", "▸".cyan(), project.name.bold());
        println!("    ID:      {}", project.id.to_string().dimmed());
        println!(
            "    Created: {}",
            project
                .created_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
        println!();
    }

    Ok(())
}

/// Show a project's runs with their current attempt's step records
pub async fn status(ctx: &CommandContext, reference: &str) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;
    let report = project_service::project_report(&ctx.pool, &project).await?;

    println!("{}", "Project:".bold());
    println!("  Name:      {}", report.name.bold());
    println!("  ID:        {}", report.id.to_string().cyan());
    println!("  Workspace: {}", report.work_dir.dimmed());

    if report.runs.is_empty() {
        println!();
        println!("{}", "No runs queued.".yellow());
        return Ok(());
    }

    for run in &report.runs {
        print_run(run);
    }

    Ok(())
}

/// Show output artifacts, or the full report as json
pub async fn output(ctx: &CommandContext, reference: &str, format: OutputFormat) -> Result<()> {
    let project = resolve_project(&ctx.pool, reference).await?;
    let report = project_service::project_report(&ctx.pool, &project).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            if report.outputs.is_empty() {
                println!("{}", "No output artifacts yet.".yellow());
            } else {
                println!(
                    "{}",
                    format!("Output artifacts for {}:", report.name).bold()
                );
                for artifact in &report.outputs {
                    println!("  {}", artifact);
                }
                println!();
                println!("  {}", format!("({}/output)", report.work_dir).dimmed());
            }
        }
    }

    Ok(())
}

/// Print one run with its step records
fn print_run(run: &RunReport) {
    println!();
    println!(
        "  {} Run {} ({})",
        "▸".cyan(),
        run.id.to_string().dimmed(),
        run.pipeline.bold()
    );
    println!("    Status:  {}", colorize_run_status(run.status));
    if run.attempt > 1 {
        println!("    Attempt: {}", run.attempt);
    }
    if let Some(summary) = &run.error_summary {
        println!("    Error:   {}", summary.red());
    }
    if run.resumable {
        println!("    {}", "Resumable with 'assay resume'".yellow());
    }

    for step in &run.steps {
        let duration = step
            .duration_secs
            .map(|d| format!(" ({:.2}s)", d))
            .unwrap_or_default();
        println!(
            "    {} {}{}",
            step_symbol(step.status),
            step.name,
            duration.dimmed()
        );
    }

    if let Some(failing) = run.failing_step() {
        if let Some(detail) = &failing.failure_detail {
            println!("    Failure detail: {}", detail.red());
        }
        if !failing.log.is_empty() {
            println!("    Captured log:");
            for line in failing.log.lines() {
                println!("      {}", line.dimmed());
            }
        }
    }
}

fn colorize_run_status(status: RunStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        RunStatus::NotStarted => status_str.dimmed(),
        RunStatus::Queued => status_str.yellow(),
        RunStatus::Running => status_str.cyan(),
        RunStatus::Success => status_str.green(),
        RunStatus::Failure => status_str.red(),
    }
}

fn step_symbol(status: StepStatus) -> colored::ColoredString {
    match status {
        StepStatus::Pending => "·".dimmed(),
        StepStatus::Running => "▸".cyan(),
        StepStatus::Success => "✓".green(),
        StepStatus::Failure => "✗".red(),
        StepStatus::Skipped => "↷".dimmed(),
    }
}
