//! Engine error types

use assay_core::domain::run::RunStatus;
use thiserror::Error;
use uuid::Uuid;

use crate::registry::RegistryError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the engine to front ends
///
/// Step-level failures are not represented here: they are recovered at the
/// executor boundary into step records, and a run always reaches a terminal
/// status instead of propagating them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("project '{0}' already has a running run")]
    ConcurrentRun(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("run not found: {0}")]
    RunNotFound(Uuid),

    #[error("run {run} is not resumable (status: {status})")]
    NotResumable { run: Uuid, status: RunStatus },

    #[error("project '{0}' has no failed run to resume")]
    NothingToResume(String),

    #[error("project '{0}' has no running run to cancel")]
    NothingToCancel(String),

    #[error("project '{0}' has no interrupted run to recover")]
    NothingToRecover(String),
}
