//! Assay Engine
//!
//! Pipeline orchestration and run execution for the Assay analysis platform.
//!
//! The engine turns a registered pipeline (an ordered step list) into a
//! supervised, resumable execution against a project's workspace:
//! - `registry`: named pipeline definitions with composition by extension
//! - `workspace`: the project's input/codebase/output/tmp directories
//! - `executor` + `step`: runs one step, capturing timing and logs
//! - `repository`: persisted run and step-record state (sqlite)
//! - `service`: queue ordering, the run state machine driver, resume

pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod registry;
pub mod repository;
pub mod service;
pub mod step;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
