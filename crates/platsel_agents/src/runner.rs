//! Pipeline entry point.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use platsel_core::{ExecutionLog, PipelineContext, PipelineExecutor, SessionState};

use crate::config::PipelineConfig;
use crate::error::{AgentError, AgentResult};
use crate::keys;
use crate::pipelines::{build_registry, Pipelines};
use crate::source::TicketSource;
use crate::tools::Toolbox;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub pipeline: String,
    pub epic: String,
    /// Final session state
    pub state: SessionState,
    pub log: ExecutionLog,
}

impl RunReport {
    /// Aggregated platforms of the last evaluated epic.
    pub fn platforms(&self) -> Vec<String> {
        self.state
            .get(keys::PLATFORM_INFO)
            .and_then(|info| info.get("platforms"))
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default()
    }

    /// Platforms per evaluated epic.
    pub fn results(&self) -> Vec<(String, Vec<String>)> {
        match self.state.get(keys::PLATFORM_RESULTS) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(epic, platforms)| {
                    let platforms = serde_json::from_value(platforms.clone()).unwrap_or_default();
                    (epic.clone(), platforms)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Seed `current_epic`, pick the pipeline variant from `config`, and run it.
pub async fn run_pipeline(
    epic: &str,
    config: &PipelineConfig,
    source: Arc<dyn TicketSource>,
) -> AgentResult<RunReport> {
    let epic = epic.trim();
    if epic.is_empty() {
        return Err(AgentError::invalid_input("runner", "epic id must not be empty"));
    }

    let tools = Toolbox::new(source);
    let registry = build_registry(&tools, &config.model);
    let pipeline = Pipelines::select(config.use_loop, config.max_iterations);

    let mut executor = PipelineExecutor::new(Arc::new(registry));
    if let Some(dir) = &config.log_dir {
        executor = executor.with_log_dir(dir);
    }

    info!("Running {} for {} (model {})", pipeline.name, epic, config.model.model);
    let context = PipelineContext::new().with_value(keys::CURRENT_EPIC, Value::String(epic.to_string()));
    let log = executor.execute(&pipeline, context).await?;

    Ok(RunReport {
        pipeline: pipeline.name.clone(),
        epic: epic.to_string(),
        state: log.context.snapshot(),
        log,
    })
}
