//! Step domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Completion record for one step within one run attempt
///
/// Records are append-only: a record is created when the driver reaches its
/// step and never updated once terminal. Resumed attempts append new records
/// under the incremented attempt number; steps satisfied by a prior attempt
/// get a `skipped` record carrying the original timestamps and log forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub run_id: Uuid,
    pub attempt: i64,
    pub step_index: i64,
    pub step_name: String,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub log: String,
    pub failure_detail: Option<String>,
}

impl StepRecord {
    /// Wall-clock duration in seconds, if the step has both timestamps
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => {
                Some(end.signed_duration_since(start).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }
}

/// Step execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failure,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failure => "failure",
            StepStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StepStatus::Pending),
            "running" => Some(StepStatus::Running),
            "success" => Some(StepStatus::Success),
            "failure" => Some(StepStatus::Failure),
            "skipped" => Some(StepStatus::Skipped),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Success | StepStatus::Failure | StepStatus::Skipped
        )
    }

    /// Whether a later attempt may skip this step instead of re-executing it
    pub fn satisfies_resume(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Skipped)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-specific failure reported by a step
///
/// This is the only error kind expected in normal operation. It is always
/// recovered at the step executor boundary into a StepRecord and never
/// propagated raw to callers.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepFailure {
    pub message: String,
    pub detail: Option<serde_json::Value>,
}

impl StepFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(message: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail),
        }
    }
}

impl From<std::io::Error> for StepFailure {
    fn from(err: std::io::Error) -> Self {
        StepFailure::new(format!("io error: {}", err))
    }
}

impl From<serde_json::Error> for StepFailure {
    fn from(err: serde_json::Error) -> Self {
        StepFailure::new(format!("serialization error: {}", err))
    }
}
