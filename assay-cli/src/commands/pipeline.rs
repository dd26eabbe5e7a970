//! Pipeline listing
//!
//! Renders the registry: built-ins first by name order, each with its
//! origin tag and resolved step sequence.

use anyhow::Result;
use colored::*;

use assay_core::domain::pipeline::PipelineOrigin;

use super::CommandContext;

/// List registered pipelines
pub async fn list(ctx: &CommandContext) -> Result<()> {
    let pipelines: Vec<_> = ctx.registry.list_all().collect();

    println!(
        "{}",
        format!("Registered pipelines ({}):", pipelines.len()).bold()
    );
    println!();

    for pipeline in pipelines {
        let origin = match pipeline.origin {
            PipelineOrigin::BuiltIn => pipeline.origin.as_str().cyan(),
            PipelineOrigin::Custom => pipeline.origin.as_str().yellow(),
        };

        println!("  {} {} [{}]", "▸".cyan(), pipeline.name.bold(), origin);
        if !pipeline.summary.is_empty() {
            println!("    {}", pipeline.summary.dimmed());
        }
        println!("    Steps: {}", pipeline.steps.join(", "));
        println!();
    }

    Ok(())
}
