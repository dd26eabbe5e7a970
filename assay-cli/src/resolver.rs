//! Project and run reference resolution
//!
//! Commands accept an exact project name, a full UUID, or an unambiguous
//! UUID prefix. Runs are referenced by full UUID or prefix within their
//! project.

use anyhow::{Context, Result, anyhow};
use uuid::Uuid;

use assay_core::domain::project::Project;
use assay_core::domain::run::Run;
use assay_engine::repository::run_repository;
use assay_engine::service::project_service;
use sqlx::SqlitePool;

/// Resolve a project reference to a project
///
/// Exact names win over UUID prefixes, so a project named like another
/// project's ID prefix still resolves by name.
pub async fn resolve_project(pool: &SqlitePool, reference: &str) -> Result<Project> {
    if let Some(project) = project_service::find_by_name(pool, reference)
        .await
        .context("Failed to look up project by name")?
    {
        return Ok(project);
    }

    if let Ok(uuid) = Uuid::parse_str(reference) {
        return project_service::get_project(pool, uuid)
            .await
            .map_err(|_| anyhow!("No project found with ID {}", uuid));
    }

    let prefix = reference.to_lowercase();
    let projects = project_service::list_projects(pool)
        .await
        .context("Failed to fetch projects for ID resolution")?;

    let matches: Vec<_> = projects
        .iter()
        .filter(|p| p.id.to_string().to_lowercase().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(anyhow!("No project found matching '{}'", reference)),
        1 => Ok(matches[0].clone()),
        _ => {
            let ids: Vec<String> = matches
                .iter()
                .map(|p| format!("{} ({})", p.id, p.name))
                .collect();
            Err(anyhow!(
                "Ambiguous reference '{}' matches multiple projects: {}",
                reference,
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a run ID or unambiguous prefix within a project
pub async fn resolve_run(pool: &SqlitePool, project: &Project, reference: &str) -> Result<Run> {
    let runs = run_repository::list_for_project(pool, project.id)
        .await
        .context("Failed to fetch runs for ID resolution")?;

    if let Ok(uuid) = Uuid::parse_str(reference) {
        return runs
            .into_iter()
            .find(|r| r.id == uuid)
            .ok_or_else(|| anyhow!("No run {} on project {}", uuid, project.name));
    }

    let prefix = reference.to_lowercase();
    let matches: Vec<_> = runs
        .iter()
        .filter(|r| r.id.to_string().to_lowercase().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(anyhow!(
            "No run found matching '{}' on project {}",
            reference,
            project.name
        )),
        1 => Ok(matches[0].clone()),
        _ => {
            let ids: Vec<String> = matches.iter().map(|r| r.id.to_string()).collect();
            Err(anyhow!(
                "Ambiguous reference '{}' matches multiple runs: {}",
                reference,
                ids.join(", ")
            ))
        }
    }
}
