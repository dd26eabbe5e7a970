//! Write summary step
//!
//! Renders the scratch inventory into the project's output artifacts:
//! `inventory.json` with the full entry list and `summary.json` with
//! aggregate counts.

use assay_core::domain::step::StepFailure;
use assay_engine::step::{Step, StepContext};
use std::fs;

use super::read_inventory;

pub struct WriteSummary;

impl Step for WriteSummary {
    fn name(&self) -> &str {
        "write_summary"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
        let entries = read_inventory(ctx.workspace())?;
        let output = ctx.workspace().output_dir();

        let total_bytes: u64 = entries.iter().map(|e| e.size).sum();
        let checksummed = entries.iter().filter(|e| e.sha256.is_some()).count();

        let summary = serde_json::json!({
            "files": entries.len(),
            "total_bytes": total_bytes,
            "checksummed": checksummed,
            "generated_at": chrono::Utc::now(),
        });

        fs::write(
            output.join("inventory.json"),
            serde_json::to_vec_pretty(&entries)?,
        )?;
        fs::write(
            output.join("summary.json"),
            serde_json::to_vec_pretty(&summary)?,
        )?;

        ctx.log(format!(
            "wrote summary for {} file(s), {} byte(s)",
            entries.len(),
            total_bytes
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::{ChecksumFiles, CollectFiles};
    use assay_engine::workspace::Workspace;

    #[test]
    fn test_renders_output_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        fs::write(workspace.codebase_dir().join("a"), "aa").unwrap();
        fs::write(workspace.codebase_dir().join("b"), "bbb").unwrap();

        let mut ctx = StepContext::new(&workspace);
        CollectFiles.run(&mut ctx).unwrap();
        ChecksumFiles.run(&mut ctx).unwrap();
        WriteSummary.run(&mut ctx).unwrap();

        let summary: serde_json::Value = serde_json::from_slice(
            &fs::read(workspace.output_dir().join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["files"], 2);
        assert_eq!(summary["total_bytes"], 5);
        assert_eq!(summary["checksummed"], 2);
        assert!(workspace.output_dir().join("inventory.json").exists());
    }
}
