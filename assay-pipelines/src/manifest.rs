//! Custom pipeline manifests
//!
//! Custom pipelines are YAML files scanned from configured directories at
//! startup, in sorted file-name order, so a manifest may extend a built-in
//! pipeline or an earlier custom one. A manifest that fails to parse or
//! register aborts startup with a descriptive error.
//!
//! ```yaml
//! name: licensed_inventory
//! summary: inventory plus checksums
//! extend: inventory
//! edits:
//!   - append: checksum_files
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use assay_core::domain::pipeline::{PipelineOrigin, PipelineSpec};
use assay_engine::registry::{PipelineRegistry, RegistryError};
use thiserror::Error;

/// Errors loading custom pipeline manifests
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Parses one YAML manifest into a pipeline spec
pub fn load_manifest(path: &Path) -> Result<PipelineSpec, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&text).map_err(|source| ManifestError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Scans one directory for `.yaml`/`.yml` manifests, sorted by file name
///
/// A configured directory that does not exist is skipped with a warning;
/// creating it later is enough to activate it.
pub fn scan_dir(dir: &Path) -> Result<Vec<PipelineSpec>, ManifestError> {
    if !dir.is_dir() {
        tracing::warn!("Pipeline directory {} does not exist, skipping", dir.display());
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| ManifestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    // an unreadable entry aborts the scan rather than silently dropping a
    // manifest
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ManifestError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        ) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut specs = Vec::with_capacity(paths.len());
    for path in paths {
        specs.push(load_manifest(&path)?);
    }
    Ok(specs)
}

/// Scans the configured directories and registers every manifest with
/// origin `custom`, returning how many were registered
pub fn load_custom_pipelines(
    registry: &mut PipelineRegistry,
    dirs: &[PathBuf],
) -> Result<usize, ManifestError> {
    let mut registered = 0;
    for dir in dirs {
        for spec in scan_dir(dir)? {
            let name = spec.name.clone();
            registry.register(spec, PipelineOrigin::Custom)?;
            tracing::info!("Registered custom pipeline '{}' from {}", name, dir.display());
            registered += 1;
        }
    }
    Ok(registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::default_registry;

    #[test]
    fn test_load_manifest_with_explicit_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.yaml");
        fs::write(
            &path,
            "name: plain\nsummary: just collect\nsteps:\n  - collect_files\n",
        )
        .unwrap();

        let spec = load_manifest(&path).unwrap();
        assert_eq!(spec.name, "plain");
        assert_eq!(spec.summary, "just collect");
    }

    #[test]
    fn test_invalid_manifest_is_descriptive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "name: [not a string\n").unwrap();

        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_scan_order_allows_extending_earlier_manifests() {
        let dir = tempfile::tempdir().unwrap();
        // 10-base sorts before 20-derived, so the extension resolves
        fs::write(
            dir.path().join("10-base.yaml"),
            "name: base\nsteps:\n  - stage_inputs\n  - collect_files\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("20-derived.yaml"),
            concat!(
                "name: derived\n",
                "extend: base\n",
                "edits:\n",
                "  - append: checksum_files\n",
                "  - substitute:\n",
                "      name: stage_inputs\n",
                "      with: write_summary\n",
            ),
        )
        .unwrap();

        let mut registry = default_registry().unwrap();
        let count =
            load_custom_pipelines(&mut registry, &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(count, 2);

        let derived = registry.resolve("derived").unwrap();
        assert_eq!(
            derived.steps,
            vec!["write_summary", "collect_files", "checksum_files"]
        );
        assert_eq!(derived.origin, PipelineOrigin::Custom);
    }

    #[test]
    fn test_duplicate_custom_name_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("clash.yaml"),
            "name: inventory\nsteps:\n  - collect_files\n",
        )
        .unwrap();

        let mut registry = default_registry().unwrap();
        let err = load_custom_pipelines(&mut registry, &[dir.path().to_path_buf()])
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Registry(RegistryError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_scan_picks_only_manifest_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b.yml"),
            "name: second\nsteps:\n  - collect_files\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.yaml"),
            "name: first\nsteps:\n  - stage_inputs\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a manifest").unwrap();
        fs::create_dir(dir.path().join("archive.yaml.d")).unwrap();

        let specs = scan_dir(dir.path()).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let mut registry = default_registry().unwrap();
        let count = load_custom_pipelines(
            &mut registry,
            &[PathBuf::from("/nonexistent/pipelines")],
        )
        .unwrap();
        assert_eq!(count, 0);
    }
}
