//! platsel CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure or state key collision
//! - 4: Configuration error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use platsel_agents::AgentError;
use platsel_core::CoreError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const CONFIG_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Describe(args) => commands::describe::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// `platsel=info,warn` unless `RUST_LOG` is set; `--verbose` forces debug.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("platsel=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("platsel=info,warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let log_result = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<AgentError>() {
            match err {
                AgentError::Config(_) => return ExitCodes::CONFIG_ERROR,
                AgentError::InvalidInput { .. } => return ExitCodes::INVALID_ARGS,
                AgentError::Core(core) => return categorize_core(core),
                _ => {}
            }
        }
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            return categorize_core(core);
        }
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("config") {
        ExitCodes::CONFIG_ERROR
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

fn categorize_core(err: &CoreError) -> u8 {
    match err {
        CoreError::Validation(_) | CoreError::MergeConflict { .. } => ExitCodes::VALIDATION_FAILURE,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_typed_errors() {
        let config = anyhow::Error::new(AgentError::config("bad file"));
        assert_eq!(categorize_error(&config), ExitCodes::CONFIG_ERROR);

        let collision = anyhow::Error::new(AgentError::Core(CoreError::MergeConflict {
            group: "g".into(),
            key: "k".into(),
        }));
        assert_eq!(categorize_error(&collision), ExitCodes::VALIDATION_FAILURE);

        let invalid = anyhow::Error::new(AgentError::invalid_input("runner", "empty epic"));
        assert_eq!(categorize_error(&invalid), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_wrapped_errors() {
        let err = anyhow::Error::new(CoreError::Validation(vec!["x".into()])).context("describing pipeline");
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);

        assert_eq!(categorize_error(&anyhow::anyhow!("disk on fire")), ExitCodes::GENERAL_ERROR);
    }
}
