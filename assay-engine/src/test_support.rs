//! Shared helpers for engine tests
//!
//! Builds isolated engine instances: a tempdir-backed sqlite pool, a config
//! rooted in the same tempdir, and registries of scripted steps whose
//! execution counts tests can observe.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assay_core::domain::pipeline::{PipelineOrigin, PipelineSpec, StepSource};
use assay_core::domain::project::Project;
use assay_core::domain::step::StepFailure;
use sqlx::SqlitePool;

use crate::config::EngineConfig;
use crate::db;
use crate::registry::{PipelineRegistry, StepRegistry};
use crate::service::project_service;
use crate::step::{Step, StepContext};

pub(crate) struct TestEnv {
    pub dir: tempfile::TempDir,
    pub pool: SqlitePool,
    pub config: EngineConfig,
}

pub(crate) async fn env() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new(dir.path());
    config.ensure_dirs().unwrap();
    let pool = db::create_pool(&config.database_path()).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    TestEnv { dir, pool, config }
}

pub(crate) async fn project(env: &TestEnv, name: &str) -> Project {
    project_service::create_project(&env.pool, &env.config, name)
        .await
        .unwrap()
}

/// Step whose first `fail_times` executions fail; counts every execution
pub(crate) struct ScriptedStep {
    name: &'static str,
    fail_times: AtomicUsize,
    executions: AtomicUsize,
}

impl ScriptedStep {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Self::failing_times(name, 0)
    }

    pub fn failing_times(name: &'static str, fail_times: usize) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail_times: AtomicUsize::new(fail_times),
            executions: AtomicUsize::new(0),
        })
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl Step for ScriptedStep {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), StepFailure> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        ctx.log(format!("{} ran", self.name));
        let remaining = self.fail_times.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_times.store(remaining - 1, Ordering::SeqCst);
            return Err(StepFailure::new(format!("{} exploded", self.name)));
        }
        Ok(())
    }
}

pub(crate) fn registry(
    steps: Vec<Arc<ScriptedStep>>,
    pipelines: &[(&str, &[&str])],
) -> PipelineRegistry {
    let mut step_registry = StepRegistry::new();
    for step in steps {
        step_registry.register(step);
    }

    let mut registry = PipelineRegistry::new(step_registry);
    for (name, step_names) in pipelines {
        registry
            .register(
                PipelineSpec {
                    name: name.to_string(),
                    summary: String::new(),
                    source: StepSource::Steps {
                        steps: step_names.iter().map(|s| s.to_string()).collect(),
                    },
                },
                PipelineOrigin::BuiltIn,
            )
            .unwrap();
    }
    registry
}
