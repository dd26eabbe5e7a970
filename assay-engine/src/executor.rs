//! Step executor
//!
//! Runs one step against the workspace, enforcing wall-clock timing, log
//! capture, and translation of every failure signal into a `StepOutcome`.
//! Failures are caught at the step boundary, not the run boundary: even a
//! panicking step becomes a recorded failure instead of corrupting the run
//! state machine's bookkeeping.

use std::panic::{self, AssertUnwindSafe};

use assay_core::domain::step::{StepFailure, StepStatus};
use chrono::{DateTime, Utc};

use crate::step::{Step, StepContext};
use crate::workspace::Workspace;

/// Result of executing one step
#[derive(Debug)]
pub struct StepOutcome {
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub log: String,
    pub failure: Option<StepFailure>,
}

impl StepOutcome {
    pub fn duration_secs(&self) -> f64 {
        self.ended_at
            .signed_duration_since(self.started_at)
            .num_milliseconds() as f64
            / 1000.0
    }

    /// Failure message plus structured detail, for the step record
    pub fn failure_detail(&self) -> Option<String> {
        self.failure.as_ref().map(|f| match &f.detail {
            Some(detail) => format!("{} ({})", f.message, detail),
            None => f.message.clone(),
        })
    }

    /// Outcome for a step that never ran because its worker was lost
    pub fn aborted(message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            status: StepStatus::Failure,
            started_at: now,
            ended_at: now,
            log: String::new(),
            failure: Some(StepFailure::new(message)),
        }
    }
}

/// Executes one step, capturing timing, logs, and any failure
pub fn execute(step: &dyn Step, workspace: &Workspace) -> StepOutcome {
    let started_at = Utc::now();
    let mut ctx = StepContext::new(workspace);

    let result = panic::catch_unwind(AssertUnwindSafe(|| step.run(&mut ctx)));

    let ended_at = Utc::now();
    let log = ctx.into_log();

    let failure = match result {
        Ok(Ok(())) => None,
        Ok(Err(failure)) => Some(failure),
        Err(payload) => Some(StepFailure::new(format!(
            "step '{}' panicked: {}",
            step.name(),
            panic_message(payload.as_ref())
        ))),
    };

    StepOutcome {
        status: if failure.is_none() {
            StepStatus::Success
        } else {
            StepStatus::Failure
        },
        started_at,
        ended_at,
        log,
        failure,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OkStep;

    impl Step for OkStep {
        fn name(&self) -> &str {
            "ok"
        }

        fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
            ctx.log("line one");
            ctx.log("line two");
            Ok(())
        }
    }

    struct FailingStep;

    impl Step for FailingStep {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
            ctx.log("made some progress");
            Err(StepFailure::with_detail(
                "archive is corrupt",
                serde_json::json!({"entry": "lib/a.jar"}),
            ))
        }
    }

    struct PanickingStep;

    impl Step for PanickingStep {
        fn name(&self) -> &str {
            "panicking"
        }

        fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
            panic!("index out of range");
        }
    }

    fn workspace(dir: &tempfile::TempDir) -> Workspace {
        Workspace::create(dir.path().join("proj")).unwrap()
    }

    #[test]
    fn test_success_captures_log_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = execute(&OkStep, &workspace(&dir));
        assert_eq!(outcome.status, StepStatus::Success);
        assert_eq!(outcome.log, "line one\nline two");
        assert!(outcome.failure.is_none());
        assert!(outcome.ended_at >= outcome.started_at);
    }

    #[test]
    fn test_failure_keeps_log_up_to_failure_point() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = execute(&FailingStep, &workspace(&dir));
        assert_eq!(outcome.status, StepStatus::Failure);
        assert_eq!(outcome.log, "made some progress");
        let detail = outcome.failure_detail().unwrap();
        assert!(detail.contains("archive is corrupt"));
        assert!(detail.contains("lib/a.jar"));
    }

    #[test]
    fn test_panic_becomes_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = execute(&PanickingStep, &workspace(&dir));
        assert_eq!(outcome.status, StepStatus::Failure);
        let failure = outcome.failure.unwrap();
        assert!(failure.message.contains("panicked"));
        assert!(failure.message.contains("index out of range"));
    }
}
