//! Built-in pipeline definitions
//!
//! The process-wide registry initialization point: built-in steps and
//! pipelines are registered here at startup, before any custom manifest
//! scan, and the registry is not mutated afterward.

use std::sync::Arc;

use assay_core::domain::pipeline::{PipelineOrigin, PipelineSpec, StepEdit, StepSource};
use assay_engine::registry::{PipelineRegistry, RegistryError, StepRegistry};

use crate::steps::{ChecksumFiles, CollectFiles, StageInputs, WriteSummary};

/// Registry of all built-in step capabilities
pub fn step_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(Arc::new(StageInputs));
    registry.register(Arc::new(CollectFiles));
    registry.register(Arc::new(ChecksumFiles));
    registry.register(Arc::new(WriteSummary));
    registry
}

/// Built-in pipeline specs, in registration order
pub fn builtin_specs() -> Vec<PipelineSpec> {
    vec![
        PipelineSpec {
            name: "inventory".to_string(),
            summary: "Stage inputs and render a file inventory of the codebase".to_string(),
            source: StepSource::Steps {
                steps: vec![
                    "stage_inputs".to_string(),
                    "collect_files".to_string(),
                    "write_summary".to_string(),
                ],
            },
        },
        PipelineSpec {
            name: "inventory_checksums".to_string(),
            summary: "File inventory with a sha256 digest per file".to_string(),
            source: StepSource::Extend {
                extend: "inventory".to_string(),
                edits: vec![
                    StepEdit::Remove("write_summary".to_string()),
                    StepEdit::Append("checksum_files".to_string()),
                    StepEdit::Append("write_summary".to_string()),
                ],
            },
        },
    ]
}

/// Builds the registry with all built-in steps and pipelines registered
pub fn default_registry() -> Result<PipelineRegistry, RegistryError> {
    let mut registry = PipelineRegistry::new(step_registry());
    for spec in builtin_specs() {
        registry.register(spec, PipelineOrigin::BuiltIn)?;
    }
    Ok(registry)
}
