//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod pipeline;
mod project;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use sqlx::SqlitePool;

use assay_engine::EngineConfig;
use assay_engine::registry::PipelineRegistry;

/// Shared handles every command handler needs
pub struct CommandContext {
    pub pool: SqlitePool,
    pub config: EngineConfig,
    pub registry: PipelineRegistry,
}

/// Rendering format for the `output` command
#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    Create {
        /// Unique project name
        name: String,

        /// Pipelines to enqueue immediately, in queue order
        #[arg(long = "pipeline")]
        pipelines: Vec<String>,

        /// Files to copy into the project's input directory
        #[arg(long = "input")]
        inputs: Vec<PathBuf>,

        /// Execute the queued pipelines right away
        #[arg(long)]
        execute: bool,
    },
    /// Copy files into a project's input directory
    AddInput {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,

        /// Files to copy
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Enqueue pipelines on a project
    AddPipeline {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,

        /// Pipeline names, in queue order
        #[arg(required = true)]
        pipelines: Vec<String>,
    },
    /// Execute the project's queued runs in creation order
    Execute {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,
    },
    /// Resume the most recent failed run, then continue the queue
    Resume {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,

        /// Resume this specific run instead of the most recent failure
        #[arg(long)]
        run: Option<String>,
    },
    /// Request cancellation of the running run
    Cancel {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,
    },
    /// Mark runs interrupted by a dead process as failed
    Recover {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,
    },
    /// Show the project's runs and their step records
    Status {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,
    },
    /// List all projects
    List,
    /// List registered pipelines
    Pipelines,
    /// Show the project's output artifacts
    Output {
        /// Project name, UUID, or unambiguous UUID prefix
        project: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Create {
            name,
            pipelines,
            inputs,
            execute,
        } => project::create(ctx, &name, pipelines, inputs, execute).await,
        Commands::AddInput { project, inputs } => project::add_input(ctx, &project, inputs).await,
        Commands::AddPipeline { project, pipelines } => {
            run::add_pipeline(ctx, &project, pipelines).await
        }
        Commands::Execute { project } => run::execute(ctx, &project).await,
        Commands::Resume { project, run: run_ref } => run::resume(ctx, &project, run_ref).await,
        Commands::Cancel { project } => run::cancel(ctx, &project).await,
        Commands::Recover { project } => run::recover(ctx, &project).await,
        Commands::Status { project } => project::status(ctx, &project).await,
        Commands::List => project::list(ctx).await,
        Commands::Pipelines => pipeline::list(ctx).await,
        Commands::Output { project, format } => project::output(ctx, &project, format).await,
    }
}
