//! Built-in steps
//!
//! Each step is one capability operating on the workspace. Steps hand work
//! forward through the scratch inventory file in `tmp/`: `collect_files`
//! writes it, `checksum_files` augments it, `write_summary` renders it into
//! output artifacts.

mod checksum_files;
mod collect_files;
mod stage_inputs;
mod write_summary;

pub use checksum_files::ChecksumFiles;
pub use collect_files::CollectFiles;
pub use stage_inputs::StageInputs;
pub use write_summary::WriteSummary;

use assay_core::domain::step::StepFailure;
use assay_engine::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::fs;

/// One file of the codebase inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

const INVENTORY_FILE: &str = "files.json";

/// Reads the scratch inventory written by `collect_files`
pub(crate) fn read_inventory(workspace: &Workspace) -> Result<Vec<FileEntry>, StepFailure> {
    let path = workspace.tmp_dir().join(INVENTORY_FILE);
    if !path.exists() {
        return Err(StepFailure::new(
            "no file inventory found; run collect_files first",
        ));
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes the scratch inventory for later steps
pub(crate) fn write_inventory(
    workspace: &Workspace,
    entries: &[FileEntry],
) -> Result<(), StepFailure> {
    let path = workspace.tmp_dir().join(INVENTORY_FILE);
    fs::write(path, serde_json::to_vec_pretty(entries)?)?;
    Ok(())
}
