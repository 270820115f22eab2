//! Run command - Evaluate an epic.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use platsel_agents::{run_pipeline, InMemoryTicketSource, PipelineConfig, RunReport};

#[derive(Args)]
pub struct RunArgs {
    /// Jira epic key, e.g. PROJ-123
    #[arg(short, long)]
    epic: String,

    /// Evaluate every epic linked to --epic
    #[arg(long)]
    use_loop: bool,

    /// Stop the loop after this many epics
    #[arg(long)]
    max_iterations: Option<usize>,

    /// TOML or YAML configuration file
    #[arg(short, long, env = "PLATSEL_CONFIG")]
    config: Option<PathBuf>,

    /// Model name handed to every agent
    #[arg(short, long)]
    model: Option<String>,

    /// JSON or YAML ticket data; defaults to the built-in demo data
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Directory for execution logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let source = match &args.data {
        Some(path) => InMemoryTicketSource::load(path)
            .with_context(|| format!("loading ticket data from {}", path.display()))?,
        None => InMemoryTicketSource::seeded(&args.epic),
    };

    info!("Evaluating epic: {}", args.epic);
    let report = run_pipeline(&args.epic, &config, Arc::new(source)).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, config.log_dir.as_deref());
    }

    Ok(())
}

/// File and environment first, then flags.
fn resolve_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::resolve(args.config.as_deref())?;

    if args.use_loop {
        config.use_loop = true;
    }
    if let Some(limit) = args.max_iterations {
        config.max_iterations = Some(limit);
    }
    if let Some(model) = &args.model {
        config.model.model = model.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = Some(dir.clone());
    }

    Ok(config)
}

fn print_report(report: &RunReport, log_dir: Option<&Path>) {
    println!("\n=== PIPELINE RESULT ===");
    println!("{} ({} steps)", report.pipeline, report.log.results.len());
    let results = report.results();
    if results.is_empty() {
        println!("   No epics evaluated");
    }
    for (epic, platforms) in results {
        println!("   {}: {}", epic, platforms.join(", "));
    }

    println!("\n=== STATE SNAPSHOT ===");
    for (key, value) in &report.state {
        match value.as_str() {
            Some(text) => println!("{}: {}", key, text),
            None => println!("{}: {}", key, value),
        }
    }

    if let Some(dir) = log_dir {
        println!("\nExecution log: {}", report.log.log_path(dir).display());
    }
}
