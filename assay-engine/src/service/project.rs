//! Project Service
//!
//! Business logic for project lifecycle: creation with workspace
//! materialization, input staging, and report assembly.

use assay_core::domain::project::Project;
use assay_core::dto::report::{ProjectReport, RunReport};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::repository::{project_repository, run_repository, step_record_repository};
use crate::workspace::Workspace;

/// Create a new project and materialize its workspace
pub async fn create_project(
    pool: &SqlitePool,
    config: &EngineConfig,
    name: &str,
) -> Result<Project> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Config("project name cannot be empty".to_string()));
    }

    if project_repository::find_by_name(pool, name).await?.is_some() {
        return Err(EngineError::ProjectExists(name.to_string()));
    }

    config.ensure_dirs()?;
    let work_dir = config
        .projects_dir()
        .join(format!("{}-{}", slug(name), unique_suffix()));
    Workspace::create(&work_dir)?;

    let project = project_repository::create(pool, name, &work_dir).await?;

    tracing::info!("Project created: {} ({})", project.name, project.id);

    Ok(project)
}

/// Get a project by ID
pub async fn get_project(pool: &SqlitePool, id: Uuid) -> Result<Project> {
    project_repository::find_by_id(pool, id)
        .await?
        .ok_or_else(|| EngineError::ProjectNotFound(id.to_string()))
}

/// Find a project by its unique name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Project>> {
    Ok(project_repository::find_by_name(pool, name).await?)
}

/// List all projects
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    Ok(project_repository::list_all(pool).await?)
}

/// Copy a file into the project's input directory
pub async fn add_input(project: &Project, source: &Path) -> Result<PathBuf> {
    let workspace = Workspace::open(&project.work_dir)?;
    let dest = workspace.add_input(source)?;

    tracing::info!(
        "Added input {} to project {}",
        dest.display(),
        project.name
    );

    Ok(dest)
}

/// Assemble the full project report: runs in creation order with their
/// current attempt's step records, plus accumulated output artifacts
pub async fn project_report(pool: &SqlitePool, project: &Project) -> Result<ProjectReport> {
    let runs = run_repository::list_for_project(pool, project.id).await?;

    let mut reports = Vec::with_capacity(runs.len());
    for run in runs {
        let records = step_record_repository::list_for_attempt(pool, run.id, run.attempt).await?;
        reports.push(RunReport::new(run, records));
    }

    let workspace = Workspace::open(&project.work_dir)?;
    let outputs = workspace.output_artifacts()?;

    Ok(ProjectReport::new(project.clone(), reports, outputs))
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "project".to_string() } else { slug }
}

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_slug() {
        assert_eq!(slug("My App 2.0"), "my-app-2-0");
        assert_eq!(slug("simple"), "simple");
        assert_eq!(slug("---"), "project");
    }

    #[tokio::test]
    async fn test_create_project_materializes_workspace() {
        let env = test_support::env().await;
        let project = create_project(&env.pool, &env.config, "scan-target").await.unwrap();

        let workspace = Workspace::open(&project.work_dir).unwrap();
        assert!(workspace.input_dir().is_dir());
        assert!(workspace.codebase_dir().is_dir());

        let found = get_project(&env.pool, project.id).await.unwrap();
        assert_eq!(found.name, "scan-target");
    }

    #[tokio::test]
    async fn test_duplicate_project_name_rejected() {
        let env = test_support::env().await;
        create_project(&env.pool, &env.config, "dup").await.unwrap();
        let err = create_project(&env.pool, &env.config, "dup").await.unwrap_err();
        assert!(matches!(err, EngineError::ProjectExists(_)));
    }

    #[tokio::test]
    async fn test_add_input_lands_in_input_dir() {
        let env = test_support::env().await;
        let project = create_project(&env.pool, &env.config, "inputs").await.unwrap();

        let source = env.dir.path().join("artifact.tar");
        std::fs::write(&source, b"bytes").unwrap();

        let dest = add_input(&project, &source).await.unwrap();
        assert!(dest.starts_with(project.work_dir.join("input")));
        assert!(dest.exists());
    }
}
