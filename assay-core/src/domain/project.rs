//! Project domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A project owns exactly one workspace and zero or more runs
///
/// Runs attached to a project have a total order (their creation position)
/// used for queue advancement; a run cannot outlive its project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub work_dir: PathBuf,
    pub created_at: DateTime<Utc>,
}
