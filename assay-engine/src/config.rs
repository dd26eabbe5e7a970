//! Engine configuration
//!
//! Defines the configurable parameters of the engine: where project data and
//! the run database live, which directories are scanned for custom pipeline
//! manifests, and the optional per-run timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for engine-owned state (database, project workspaces)
    pub data_dir: PathBuf,

    /// Directories scanned at startup for custom pipeline manifests
    pub pipeline_dirs: Vec<PathBuf>,

    /// Maximum wall-clock time for one run attempt, checked at step
    /// boundaries only. `None` disables the timeout.
    pub run_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Creates a configuration with defaults rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            pipeline_dirs: Vec::new(),
            run_timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - ASSAY_DATA_DIR (optional, default: ".assay")
    /// - ASSAY_PIPELINES_DIR (optional, colon-separated directory list)
    /// - ASSAY_RUN_TIMEOUT (optional, seconds)
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("ASSAY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".assay"));

        let pipeline_dirs = std::env::var("ASSAY_PIPELINES_DIR")
            .map(|v| v.split(':').map(PathBuf::from).collect())
            .unwrap_or_default();

        let run_timeout = match std::env::var("ASSAY_RUN_TIMEOUT") {
            Ok(v) => {
                let secs = v.parse::<u64>().map_err(|_| {
                    EngineError::Config(format!("ASSAY_RUN_TIMEOUT must be a number of seconds, got '{}'", v))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let config = Self {
            data_dir,
            pipeline_dirs,
            run_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Adds a custom pipeline manifest directory
    pub fn with_pipeline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipeline_dirs.push(dir.into());
        self
    }

    /// Path of the engine's sqlite database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("assay.db")
    }

    /// Directory under which project workspaces are materialized
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(EngineError::Config("data_dir cannot be empty".to_string()));
        }

        if let Some(timeout) = self.run_timeout
            && timeout.is_zero()
        {
            return Err(EngineError::Config(
                "run_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Ensures the data and projects directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.projects_dir())?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Path::new(".assay"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.database_path(), PathBuf::from(".assay/assay.db"));
        assert!(config.pipeline_dirs.is_empty());
        assert!(config.run_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::new("data");
        assert!(config.validate().is_ok());

        config.run_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config.run_timeout = Some(Duration::from_secs(60));
        assert!(config.validate().is_ok());

        config.data_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_pipeline_dir() {
        let config = EngineConfig::new("data")
            .with_pipeline_dir("a")
            .with_pipeline_dir("b");
        assert_eq!(
            config.pipeline_dirs,
            vec![PathBuf::from("a"), PathBuf::from("b")]
        );
    }
}
