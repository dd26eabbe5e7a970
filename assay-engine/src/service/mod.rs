//! Service Module
//!
//! Business logic layer for the engine.
//! Services orchestrate between repositories, the registry, and the
//! workspace, and contain the run state machine and queue logic.

pub mod execution;
pub mod project;
pub mod queue;

// Re-export for convenience
pub use execution as execution_service;
pub use project as project_service;
pub use queue as queue_service;
