//! Stage inputs step
//!
//! Mirrors the project's input directory into the codebase directory so
//! later steps read materialized resources instead of the read-only inputs.

use assay_core::domain::step::StepFailure;
use assay_engine::step::{Step, StepContext};
use std::fs;

pub struct StageInputs;

impl Step for StageInputs {
    fn name(&self) -> &str {
        "stage_inputs"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
        let input = ctx.workspace().input_dir();
        let codebase = ctx.workspace().codebase_dir();

        let mut staged = 0usize;
        for entry in walkdir::WalkDir::new(&input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let rel = entry
                .path()
                .strip_prefix(&input)
                .map_err(|e| StepFailure::new(format!("input path escaped input dir: {}", e)))?
                .to_path_buf();

            let dest = codebase.join(&rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest)?;
            staged += 1;
        }

        ctx.log(format!("staged {} input file(s) into codebase", staged));
        Ok(())
    }
}
