//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod describe;
pub mod run;

/// platsel - decide which platforms a Jira epic affects
#[derive(Parser)]
#[command(name = "platsel")]
#[command(version, about = "platsel - decide which platforms a Jira epic affects")]
#[command(long_about = r#"
platsel runs a pipeline of deterministic agents over an epic's attachments
and metadata and reports the affected platforms (ios, android, web, backend,
api).

COMMANDS:
  run       → Evaluate an epic, or every epic linked to it with --use-loop
  describe  → Print the pipeline topology and the keys each agent touches

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure or state key collision
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the platform selection pipeline for an epic
    Run(run::RunArgs),

    /// Describe a pipeline without running it
    Describe(describe::DescribeArgs),
}
