//! Collect files step
//!
//! Walks the codebase directory and writes the scratch file inventory that
//! later steps augment and render.

use assay_core::domain::step::StepFailure;
use assay_engine::step::{Step, StepContext};

use super::{FileEntry, write_inventory};

pub struct CollectFiles;

impl Step for CollectFiles {
    fn name(&self) -> &str {
        "collect_files"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
        let codebase = ctx.workspace().codebase_dir();

        let mut entries = Vec::new();
        for entry in walkdir::WalkDir::new(&codebase)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let rel = entry
                .path()
                .strip_prefix(&codebase)
                .map_err(|e| StepFailure::new(format!("file escaped codebase dir: {}", e)))?;
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            entries.push(FileEntry {
                path: rel.display().to_string(),
                size,
                sha256: None,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        write_inventory(ctx.workspace(), &entries)?;
        ctx.log(format!("collected {} file(s) from codebase", entries.len()));
        Ok(())
    }
}
