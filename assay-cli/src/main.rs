//! Assay CLI
//!
//! Command-line front end for the Assay pipeline engine.

mod commands;
mod progress;
mod resolver;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assay_engine::{EngineConfig, db};
use assay_pipelines::{default_registry, manifest};
use commands::{CommandContext, Commands, handle_command};

#[derive(Parser)]
#[command(name = "assay")]
#[command(about = "Assay pipeline orchestration CLI", long_about = None)]
struct Cli {
    /// Root directory for engine state (database, project workspaces)
    #[arg(long, env = "ASSAY_DATA_DIR", default_value = ".assay")]
    data_dir: PathBuf,

    /// Directories scanned for custom pipeline manifests
    #[arg(long = "pipelines-dir", env = "ASSAY_PIPELINES_DIR", value_delimiter = ':')]
    pipeline_dirs: Vec<PathBuf>,

    /// Per-run timeout in seconds, checked at step boundaries
    #[arg(long, env = "ASSAY_RUN_TIMEOUT")]
    run_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assay=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::new(cli.data_dir);
    config.pipeline_dirs = cli.pipeline_dirs;
    config.run_timeout = cli.run_timeout.map(Duration::from_secs);
    config.validate()?;
    config.ensure_dirs()?;

    let pool = db::create_pool(&config.database_path())
        .await
        .context("Failed to open the run database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let mut registry = default_registry().context("Failed to register built-in pipelines")?;
    let custom = manifest::load_custom_pipelines(&mut registry, &config.pipeline_dirs)
        .context("Failed to load custom pipeline manifests")?;
    tracing::debug!(
        "Engine ready: data dir {}, {} custom pipeline(s)",
        config.data_dir.display(),
        custom
    );

    let ctx = CommandContext {
        pool,
        config,
        registry,
    };

    handle_command(cli.command, &ctx).await
}
