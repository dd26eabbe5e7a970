//! Report DTOs
//!
//! Rendered by the CLI `status` and `output` commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project::Project;
use crate::domain::run::{Run, RunStatus};
use crate::domain::step::{StepRecord, StepStatus};

/// View of one step record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
    pub log: String,
    pub failure_detail: Option<String>,
}

impl From<StepRecord> for StepReport {
    fn from(record: StepRecord) -> Self {
        let duration_secs = record.duration_secs();
        Self {
            name: record.step_name,
            status: record.status,
            started_at: record.started_at,
            ended_at: record.ended_at,
            duration_secs,
            log: record.log,
            failure_detail: record.failure_detail,
        }
    }
}

/// View of one run with the current attempt's step records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub id: Uuid,
    pub pipeline: String,
    pub status: RunStatus,
    pub attempt: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error_summary: Option<String>,
    pub resumable: bool,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new(run: Run, records: Vec<StepRecord>) -> Self {
        let resumable = run.is_resumable();
        Self {
            id: run.id,
            pipeline: run.pipeline,
            status: run.status,
            attempt: run.attempt,
            created_at: run.created_at,
            started_at: run.started_at,
            ended_at: run.ended_at,
            error_summary: run.error_summary,
            resumable,
            steps: records.into_iter().map(StepReport::from).collect(),
        }
    }

    /// The first failed step of the current attempt, if any
    pub fn failing_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.status == StepStatus::Failure)
    }
}

/// Full project view: runs in creation order plus accumulated output
/// artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    pub id: Uuid,
    pub name: String,
    pub work_dir: String,
    pub created_at: DateTime<Utc>,
    pub runs: Vec<RunReport>,
    pub outputs: Vec<String>,
}

impl ProjectReport {
    pub fn new(project: Project, runs: Vec<RunReport>, outputs: Vec<String>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            work_dir: project.work_dir.display().to_string(),
            created_at: project.created_at,
            runs,
            outputs,
        }
    }
}
