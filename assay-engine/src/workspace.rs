//! Workspace handle
//!
//! Every project owns one workspace with four directory roles:
//! - `input/`: uploaded source data, read-only to steps
//! - `codebase/`: materialized resources steps write and later steps read
//! - `output/`: final artifacts
//! - `tmp/`: scratch space, purged only after a run ends in success
//!
//! Input, codebase, and output contents persist across runs and across the
//! project's lifetime.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const INPUT_DIR: &str = "input";
const CODEBASE_DIR: &str = "codebase";
const OUTPUT_DIR: &str = "output";
const TMP_DIR: &str = "tmp";

/// Handle to a project's workspace directories
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates the workspace layout under `root`
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let workspace = Self { root: root.into() };
        for dir in [
            workspace.input_dir(),
            workspace.codebase_dir(),
            workspace.output_dir(),
            workspace.tmp_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(workspace)
    }

    /// Opens an existing workspace, recreating any missing role directory
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        Self::create(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(INPUT_DIR)
    }

    pub fn codebase_dir(&self) -> PathBuf {
        self.root.join(CODEBASE_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR)
    }

    /// Copies a file into the input directory, returning the destination path
    pub fn add_input(&self, source: &Path) -> io::Result<PathBuf> {
        let file_name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("input path has no file name: {}", source.display()),
            )
        })?;
        let dest = self.input_dir().join(file_name);
        fs::copy(source, &dest)?;
        Ok(dest)
    }

    /// Removes all scratch contents, keeping the tmp directory itself
    pub fn purge_tmp(&self) -> io::Result<()> {
        let tmp = self.tmp_dir();
        if tmp.exists() {
            fs::remove_dir_all(&tmp)?;
        }
        fs::create_dir_all(&tmp)
    }

    /// Output artifact paths relative to the output directory, sorted
    pub fn output_artifacts(&self) -> io::Result<Vec<String>> {
        let output = self.output_dir();
        let mut artifacts = Vec::new();
        for entry in walkdir::WalkDir::new(&output)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(rel) = entry.path().strip_prefix(&output) {
                artifacts.push(rel.display().to_string());
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lays_out_directories() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        assert!(workspace.input_dir().is_dir());
        assert!(workspace.codebase_dir().is_dir());
        assert!(workspace.output_dir().is_dir());
        assert!(workspace.tmp_dir().is_dir());
    }

    #[test]
    fn test_add_input_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.txt");
        fs::write(&source, "payload").unwrap();

        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        let dest = workspace.add_input(&source).unwrap();

        assert_eq!(dest, workspace.input_dir().join("data.txt"));
        assert_eq!(fs::read_to_string(dest).unwrap(), "payload");
    }

    #[test]
    fn test_purge_tmp_keeps_other_roles() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        fs::write(workspace.tmp_dir().join("scratch"), "x").unwrap();
        fs::write(workspace.output_dir().join("report.json"), "{}").unwrap();

        workspace.purge_tmp().unwrap();

        assert!(workspace.tmp_dir().is_dir());
        assert!(!workspace.tmp_dir().join("scratch").exists());
        assert!(workspace.output_dir().join("report.json").exists());
    }

    #[test]
    fn test_output_artifacts_sorted_relative() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path().join("proj")).unwrap();
        fs::create_dir_all(workspace.output_dir().join("nested")).unwrap();
        fs::write(workspace.output_dir().join("nested/b.json"), "{}").unwrap();
        fs::write(workspace.output_dir().join("a.json"), "{}").unwrap();

        let artifacts = workspace.output_artifacts().unwrap();
        assert_eq!(artifacts, vec!["a.json", "nested/b.json"]);
    }
}
