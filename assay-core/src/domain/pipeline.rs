//! Pipeline domain types
//!
//! A pipeline is a named, ordered list of step references. Definitions are
//! immutable once registered; a spec may either list its steps verbatim or
//! extend another definition's sequence through position-preserving edits.

use serde::{Deserialize, Serialize};

/// A registered pipeline: resolved step sequence plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub steps: Vec<String>,
    pub summary: String,
    pub origin: PipelineOrigin,
}

/// Where a pipeline definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOrigin {
    BuiltIn,
    Custom,
}

impl PipelineOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineOrigin::BuiltIn => "built-in",
            PipelineOrigin::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PipelineOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unregistered pipeline description, as written in a manifest or built-in
/// table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub source: StepSource,
}

/// How a spec provides its step sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepSource {
    /// Explicit ordered step list
    Steps { steps: Vec<String> },
    /// Reuse another definition's sequence, then apply edits in order
    Extend {
        extend: String,
        #[serde(default)]
        edits: Vec<StepEdit>,
    },
}

/// A single transformation of a base step sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEdit {
    /// Add a step at the end of the sequence
    Append(String),
    /// Remove the named step
    Remove(String),
    /// Replace the named step in place, preserving its position
    Substitute { name: String, with: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_with_explicit_steps() {
        let json = r#"{"name": "inventory", "summary": "files", "steps": ["a", "b"]}"#;
        let spec: PipelineSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.name, "inventory");
        match spec.source {
            StepSource::Steps { steps } => assert_eq!(steps, vec!["a", "b"]),
            StepSource::Extend { .. } => panic!("expected explicit steps"),
        }
    }

    #[test]
    fn test_spec_with_extension() {
        let json = r#"{
            "name": "derived",
            "extend": "inventory",
            "edits": [
                {"append": "c"},
                {"remove": "a"},
                {"substitute": {"name": "b", "with": "d"}}
            ]
        }"#;
        let spec: PipelineSpec = serde_json::from_str(json).unwrap();
        match spec.source {
            StepSource::Extend { extend, edits } => {
                assert_eq!(extend, "inventory");
                assert_eq!(
                    edits,
                    vec![
                        StepEdit::Append("c".to_string()),
                        StepEdit::Remove("a".to_string()),
                        StepEdit::Substitute {
                            name: "b".to_string(),
                            with: "d".to_string()
                        },
                    ]
                );
            }
            StepSource::Steps { .. } => panic!("expected extension"),
        }
    }
}
