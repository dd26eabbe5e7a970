//! Run domain types
//!
//! A Run is one execution instance of a pipeline against a project. Its
//! status moves through a small state machine that is persisted between
//! process restarts, so every transition here must stay valid against
//! whatever an earlier process left behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Run execution record
///
/// Structure shared between the engine (persists, executes) and front ends
/// (display). `position` is the per-project creation order used by the queue
/// controller; `attempt` starts at 1 and is incremented by each resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub project_id: Uuid,
    pub pipeline: String,
    pub status: RunStatus,
    pub position: i64,
    pub attempt: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error_summary: Option<String>,
    pub cancel_requested: bool,
}

impl Run {
    /// Whether this run can be resumed (only failed runs are resumable)
    pub fn is_resumable(&self) -> bool {
        self.status == RunStatus::Failure
    }
}

/// Run execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NotStarted,
    Queued,
    Running,
    Success,
    Failure,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::NotStarted => "not_started",
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failure => "failure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(RunStatus::NotStarted),
            "queued" => Some(RunStatus::Queued),
            "running" => Some(RunStatus::Running),
            "success" => Some(RunStatus::Success),
            "failure" => Some(RunStatus::Failure),
            _ => None,
        }
    }

    /// A successful run is terminal and immutable; a failed run is terminal
    /// for automatic progression but may be resumed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failure)
    }

    /// Valid state machine transitions:
    ///
    /// ```text
    /// not_started -> queued    (enqueue)
    /// queued      -> running   (claim)
    /// running     -> success
    /// running     -> failure
    /// failure     -> running   (resume)
    /// ```
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::NotStarted, RunStatus::Queued)
                | (RunStatus::Queued, RunStatus::Running)
                | (RunStatus::Running, RunStatus::Success)
                | (RunStatus::Running, RunStatus::Failure)
                | (RunStatus::Failure, RunStatus::Running)
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
