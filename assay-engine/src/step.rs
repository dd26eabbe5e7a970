//! Step abstraction
//!
//! A step is a pure capability: given the workspace it performs analysis
//! work and either completes (optionally emitting log lines) or signals a
//! failure with a message. The engine is deliberately ignorant of what a
//! step does.

use assay_core::domain::step::StepFailure;

use crate::workspace::Workspace;

/// A single unit of work within a run
///
/// Implementations must be Send + Sync: execution happens on a blocking
/// worker thread, and registries share steps across runs.
pub trait Step: Send + Sync {
    /// Unique name steps are referenced by in pipeline definitions
    fn name(&self) -> &str;

    /// Performs the work against the workspace
    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure>;
}

/// Execution context passed to a step
///
/// Captures emitted log lines in emission order; the executor joins them
/// into the step record's log text.
pub struct StepContext<'a> {
    workspace: &'a Workspace,
    lines: Vec<String>,
}

impl<'a> StepContext<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            lines: Vec::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    /// Emits a human-readable log line
    pub fn log(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Joins captured lines, preserving emission order
    pub fn into_log(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_emission_order() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        let mut ctx = StepContext::new(&workspace);
        ctx.log("first");
        ctx.log("second");
        ctx.log("third");
        assert_eq!(ctx.into_log(), "first\nsecond\nthird");
    }
}
