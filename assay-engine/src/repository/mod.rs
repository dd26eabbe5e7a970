//! Repository Module
//!
//! Data access layer for the engine.
//! Each repository handles database operations for a specific domain entity.

pub mod project;
pub mod run;
pub mod step_record;

// Re-export for convenience
pub use project as project_repository;
pub use run as run_repository;
pub use step_record as step_record_repository;
