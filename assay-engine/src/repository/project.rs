//! Project Repository
//!
//! Handles all database operations related to projects.

use assay_core::domain::project::Project;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Create a new project in the database
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    work_dir: &Path,
) -> Result<Project, sqlx::Error> {
    let project = Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
        work_dir: work_dir.to_path_buf(),
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO projects (id, name, work_dir, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(project.id.to_string())
    .bind(&project.name)
    .bind(project.work_dir.display().to_string())
    .bind(project.created_at)
    .execute(pool)
    .await?;

    Ok(project)
}

/// Find a project by ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, name, work_dir, created_at
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find a project by its unique name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, name, work_dir, created_at
        FROM projects
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all projects in creation order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Project>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, name, work_dir, created_at
        FROM projects
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    work_dir: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            name: row.name,
            work_dir: PathBuf::from(row.work_dir),
            created_at: row.created_at,
        }
    }
}
