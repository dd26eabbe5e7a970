//! Progress rendering
//!
//! Streams step-level progress lines to stdout while runs execute.

use assay_core::domain::run::Run;
use assay_engine::service::execution_service::ExecutionObserver;
use colored::*;

pub struct ProgressPrinter;

impl ExecutionObserver for ProgressPrinter {
    fn step_started(&self, _run: &Run, step: &str) {
        println!("  {} Step [{}] starting", "▸".cyan(), step.bold());
    }

    fn step_completed(&self, _run: &Run, step: &str, duration_secs: f64) {
        println!(
            "  {} Step [{}] completed in {:.2}s",
            "✓".green(),
            step.bold(),
            duration_secs
        );
    }

    fn step_skipped(&self, _run: &Run, step: &str) {
        println!(
            "  {} Step [{}] skipped (satisfied by an earlier attempt)",
            "↷".dimmed(),
            step.bold()
        );
    }

    fn step_failed(&self, _run: &Run, step: &str, message: &str) {
        println!("  {} Step [{}] failed: {}", "✗".red(), step.bold(), message.red());
    }
}
