//! Pipeline and step registries
//!
//! Registries are populated once at process start (built-ins, then custom
//! manifest scans) and not mutated afterward. Registration validates
//! everything up front: extension bases must exist, edits must target steps
//! present in the base sequence, and every resolved step name must be backed
//! by a registered step capability.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use assay_core::domain::pipeline::{
    PipelineDefinition, PipelineOrigin, PipelineSpec, StepEdit, StepSource,
};
use thiserror::Error;

use crate::step::Step;

/// Registration-time errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("pipeline '{name}' is already registered ({existing} origin)")]
    DuplicateName {
        name: String,
        existing: PipelineOrigin,
    },

    #[error("unknown pipeline: {0}")]
    UnknownPipeline(String),

    #[error("pipeline '{pipeline}' references unknown step '{step}'")]
    UnresolvedStep { pipeline: String, step: String },

    #[error("pipeline '{0}' has no steps")]
    Empty(String),

    #[error("pipeline '{pipeline}' lists step '{step}' more than once")]
    DuplicateStep { pipeline: String, step: String },
}

/// Registry of step capabilities, keyed by step name
#[derive(Default)]
pub struct StepRegistry {
    steps: BTreeMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, step: Arc<dyn Step>) {
        self.steps.insert(step.name().to_string(), step);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }
}

/// Registry of pipeline definitions, keyed by pipeline name
pub struct PipelineRegistry {
    steps: StepRegistry,
    pipelines: BTreeMap<String, PipelineDefinition>,
}

impl PipelineRegistry {
    pub fn new(steps: StepRegistry) -> Self {
        Self {
            steps,
            pipelines: BTreeMap::new(),
        }
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// Registers a pipeline spec, resolving extension edits against the base
    /// definition and validating the final sequence
    pub fn register(
        &mut self,
        spec: PipelineSpec,
        origin: PipelineOrigin,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.pipelines.get(&spec.name) {
            return Err(RegistryError::DuplicateName {
                name: spec.name,
                existing: existing.origin,
            });
        }

        let steps = match &spec.source {
            StepSource::Steps { steps } => steps.clone(),
            StepSource::Extend { extend, edits } => {
                let base = self
                    .pipelines
                    .get(extend)
                    .ok_or_else(|| RegistryError::UnknownPipeline(extend.clone()))?;
                apply_edits(&spec.name, &base.steps, edits)?
            }
        };

        if steps.is_empty() {
            return Err(RegistryError::Empty(spec.name));
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.clone()) {
                return Err(RegistryError::DuplicateStep {
                    pipeline: spec.name,
                    step: step.clone(),
                });
            }
            if !self.steps.contains(step) {
                return Err(RegistryError::UnresolvedStep {
                    pipeline: spec.name,
                    step: step.clone(),
                });
            }
        }

        tracing::debug!("Registered pipeline '{}' ({} origin)", spec.name, origin);

        self.pipelines.insert(
            spec.name.clone(),
            PipelineDefinition {
                name: spec.name,
                steps,
                summary: spec.summary,
                origin,
            },
        );

        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&PipelineDefinition, RegistryError> {
        self.pipelines
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPipeline(name.to_string()))
    }

    /// All definitions, ordered by name, each tagged with its origin
    pub fn list_all(&self) -> impl Iterator<Item = &PipelineDefinition> {
        self.pipelines.values()
    }
}

/// Applies extension edits to a base step sequence
///
/// Remove and substitute target steps by name and fail if the name is absent
/// from the sequence at the time the edit applies.
pub fn apply_edits(
    pipeline: &str,
    base: &[String],
    edits: &[StepEdit],
) -> Result<Vec<String>, RegistryError> {
    let mut steps: Vec<String> = base.to_vec();

    for edit in edits {
        match edit {
            StepEdit::Append(name) => steps.push(name.clone()),
            StepEdit::Remove(name) => {
                let index = find_step(pipeline, &steps, name)?;
                steps.remove(index);
            }
            StepEdit::Substitute { name, with } => {
                let index = find_step(pipeline, &steps, name)?;
                steps[index] = with.clone();
            }
        }
    }

    Ok(steps)
}

fn find_step(pipeline: &str, steps: &[String], name: &str) -> Result<usize, RegistryError> {
    steps
        .iter()
        .position(|s| s == name)
        .ok_or_else(|| RegistryError::UnresolvedStep {
            pipeline: pipeline.to_string(),
            step: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::domain::step::StepFailure;
    use crate::step::StepContext;

    struct NoopStep {
        name: &'static str,
    }

    impl Step for NoopStep {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
            Ok(())
        }
    }

    fn step_registry(names: &[&'static str]) -> StepRegistry {
        let mut registry = StepRegistry::new();
        for name in names {
            registry.register(Arc::new(NoopStep { name }));
        }
        registry
    }

    fn spec(name: &str, steps: &[&str]) -> PipelineSpec {
        PipelineSpec {
            name: name.to_string(),
            summary: String::new(),
            source: StepSource::Steps {
                steps: steps.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn extend_spec(name: &str, base: &str, edits: Vec<StepEdit>) -> PipelineSpec {
        PipelineSpec {
            name: name.to_string(),
            summary: String::new(),
            source: StepSource::Extend {
                extend: base.to_string(),
                edits,
            },
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1", "s2"]));
        registry
            .register(spec("basic", &["s1", "s2"]), PipelineOrigin::BuiltIn)
            .unwrap();

        let definition = registry.resolve("basic").unwrap();
        assert_eq!(definition.steps, vec!["s1", "s2"]);
        assert_eq!(definition.origin, PipelineOrigin::BuiltIn);

        assert!(matches!(
            registry.resolve("missing"),
            Err(RegistryError::UnknownPipeline(_))
        ));
    }

    #[test]
    fn test_duplicate_name_reports_existing_origin() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1"]));
        registry
            .register(spec("basic", &["s1"]), PipelineOrigin::BuiltIn)
            .unwrap();

        let err = registry
            .register(spec("basic", &["s1"]), PipelineOrigin::Custom)
            .unwrap_err();
        match err {
            RegistryError::DuplicateName { name, existing } => {
                assert_eq!(name, "basic");
                assert_eq!(existing, PipelineOrigin::BuiltIn);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unregistered_step_is_rejected() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1"]));
        let err = registry
            .register(spec("basic", &["s1", "ghost"]), PipelineOrigin::BuiltIn)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnresolvedStep { step, .. } if step == "ghost"));
    }

    #[test]
    fn test_empty_and_duplicate_sequences_rejected() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1"]));
        assert!(matches!(
            registry.register(spec("empty", &[]), PipelineOrigin::BuiltIn),
            Err(RegistryError::Empty(_))
        ));
        assert!(matches!(
            registry.register(spec("dup", &["s1", "s1"]), PipelineOrigin::BuiltIn),
            Err(RegistryError::DuplicateStep { .. })
        ));
    }

    #[test]
    fn test_extension_applies_edits_in_order() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1", "s2", "s3", "s4"]));
        registry
            .register(spec("base", &["s1", "s2", "s3"]), PipelineOrigin::BuiltIn)
            .unwrap();
        registry
            .register(
                extend_spec(
                    "derived",
                    "base",
                    vec![
                        StepEdit::Remove("s2".to_string()),
                        StepEdit::Substitute {
                            name: "s3".to_string(),
                            with: "s4".to_string(),
                        },
                        StepEdit::Append("s2".to_string()),
                    ],
                ),
                PipelineOrigin::Custom,
            )
            .unwrap();

        let derived = registry.resolve("derived").unwrap();
        assert_eq!(derived.steps, vec!["s1", "s4", "s2"]);
        // base sequence is untouched
        assert_eq!(registry.resolve("base").unwrap().steps, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_extension_of_unknown_base() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1"]));
        let err = registry
            .register(extend_spec("derived", "ghost", vec![]), PipelineOrigin::Custom)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownPipeline(base) if base == "ghost"));
    }

    #[test]
    fn test_edit_targeting_absent_step() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1", "s2"]));
        registry
            .register(spec("base", &["s1"]), PipelineOrigin::BuiltIn)
            .unwrap();
        let err = registry
            .register(
                extend_spec(
                    "derived",
                    "base",
                    vec![StepEdit::Remove("s2".to_string())],
                ),
                PipelineOrigin::Custom,
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnresolvedStep { step, .. } if step == "s2"));
    }

    #[test]
    fn test_extension_round_trip_independent_of_order() {
        // The derived sequence equals the edits applied to the base
        // sequence, regardless of what else is registered around them.
        let edits = vec![
            StepEdit::Remove("s3".to_string()),
            StepEdit::Append("s4".to_string()),
            StepEdit::Append("s3".to_string()),
        ];
        let base_steps = ["s1", "s2", "s3"];
        let expected = apply_edits(
            "derived",
            &base_steps.map(String::from),
            &edits,
        )
        .unwrap();

        for interleave_first in [true, false] {
            let mut registry =
                PipelineRegistry::new(step_registry(&["s1", "s2", "s3", "s4", "s5"]));
            if interleave_first {
                registry
                    .register(spec("other", &["s5"]), PipelineOrigin::BuiltIn)
                    .unwrap();
            }
            registry
                .register(spec("base", &base_steps), PipelineOrigin::BuiltIn)
                .unwrap();
            registry
                .register(
                    extend_spec("derived", "base", edits.clone()),
                    PipelineOrigin::Custom,
                )
                .unwrap();
            if !interleave_first {
                registry
                    .register(spec("other", &["s5"]), PipelineOrigin::BuiltIn)
                    .unwrap();
            }

            assert_eq!(registry.resolve("derived").unwrap().steps, expected);
        }
    }

    #[test]
    fn test_list_all_is_name_ordered_and_restartable() {
        let mut registry = PipelineRegistry::new(step_registry(&["s1"]));
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(spec(name, &["s1"]), PipelineOrigin::BuiltIn)
                .unwrap();
        }

        let names: Vec<&str> = registry.list_all().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);

        // restartable: a fresh iterator yields the same sequence
        let again: Vec<&str> = registry.list_all().map(|d| d.name.as_str()).collect();
        assert_eq!(names, again);
    }
}
