//! Assay Pipelines
//!
//! Built-in analysis steps and pipeline definitions, plus the YAML manifest
//! loader for custom pipelines. The steps here are deliberately thin file
//! inventory capabilities; they exist to give the engine real, chained,
//! workspace-exercising work, not to be a full analysis suite.

pub mod builtins;
pub mod manifest;
pub mod steps;

pub use builtins::default_registry;
