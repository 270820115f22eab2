//! Describe command - Print a pipeline and the keys its agents touch.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use platsel_agents::{build_registry, InMemoryTicketSource, ModelConfig, Pipelines, Toolbox};
use platsel_core::find_issues;

#[derive(Args)]
pub struct DescribeArgs {
    /// Describe the linked-epic loop instead of the single-epic pipeline
    #[arg(long)]
    use_loop: bool,
}

pub async fn execute(args: DescribeArgs) -> Result<()> {
    let tools = Toolbox::new(Arc::new(InMemoryTicketSource::new()));
    let registry = build_registry(&tools, &ModelConfig::default());
    let pipeline = Pipelines::select(args.use_loop, None);

    println!("{}", pipeline.name);
    if let Some(description) = &pipeline.description {
        println!("{}", description);
    }
    println!();
    print!("{}", pipeline.root);

    println!("\nAgents:");
    for name in pipeline.root.leaf_names() {
        let Some(step) = registry.get(name) else {
            println!("   {} (not registered)", name);
            continue;
        };
        let keys = step.keys();
        println!("   {} - {}", name, step.description());
        println!("      reads:  {}", keys.reads.iter().cloned().collect::<Vec<_>>().join(", "));
        println!("      writes: {}", keys.writes.iter().cloned().collect::<Vec<_>>().join(", "));
    }

    let issues = find_issues(&pipeline, &registry);
    println!();
    if issues.is_empty() {
        println!("Validation passed");
        Ok(())
    } else {
        for issue in &issues {
            println!("   - {}", issue);
        }
        bail!("Validation failed with {} issues", issues.len())
    }
}
