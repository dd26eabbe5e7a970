//! Checksum files step
//!
//! Augments the scratch inventory with a sha256 digest per file.

use assay_core::domain::step::StepFailure;
use assay_engine::step::{Step, StepContext};
use sha2::{Digest, Sha256};
use std::fs;

use super::{read_inventory, write_inventory};

pub struct ChecksumFiles;

impl Step for ChecksumFiles {
    fn name(&self) -> &str {
        "checksum_files"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
        let mut entries = read_inventory(ctx.workspace())?;
        let codebase = ctx.workspace().codebase_dir();

        for entry in &mut entries {
            let bytes = fs::read(codebase.join(&entry.path))?;
            let digest = Sha256::digest(&bytes);
            entry.sha256 = Some(format!("{:x}", digest));
        }

        write_inventory(ctx.workspace(), &entries)?;
        ctx.log(format!("checksummed {} file(s)", entries.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::CollectFiles;
    use assay_engine::workspace::Workspace;

    #[test]
    fn test_requires_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();

        let mut ctx = StepContext::new(&workspace);
        let err = ChecksumFiles.run(&mut ctx).unwrap_err();
        assert!(err.message.contains("collect_files"));
    }

    #[test]
    fn test_adds_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        fs::write(workspace.codebase_dir().join("hello.txt"), "hello").unwrap();

        let mut ctx = StepContext::new(&workspace);
        CollectFiles.run(&mut ctx).unwrap();
        ChecksumFiles.run(&mut ctx).unwrap();

        let entries = read_inventory(&workspace).unwrap();
        assert_eq!(
            entries[0].sha256.as_deref(),
            // sha256("hello")
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
    }
}
