//! Pipeline executor with execution log persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::context::PipelineContext;
use crate::error::{CoreError, CoreResult};
use crate::pipeline::{Node, Pipeline};
use crate::queue;
use crate::registry::StepRegistry;
use crate::step::StepResult;
use crate::validate;

/// Pipeline run state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Pipeline has not started
    #[default]
    Pending,
    /// Pipeline is currently running
    Running,
    /// Pipeline completed successfully
    Completed,
    /// Pipeline stopped at a failing step
    Failed,
}

/// Execution log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub step: String,
    pub result: StepResult,
}

/// Record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    /// Pipeline name
    pub pipeline: String,
    /// Execution state
    pub state: ExecutionState,
    /// Results of every leaf step, in completion order per branch
    pub results: Vec<ExecutionLogEntry>,
    /// When execution started
    pub started_at: Option<chrono::DateTime<Utc>>,
    /// When execution completed/failed
    pub completed_at: Option<chrono::DateTime<Utc>>,
    /// Error message if failed
    pub error: Option<String>,
    /// Context at the end of the run
    pub context: PipelineContext,
}

impl ExecutionLog {
    pub fn new(pipeline: impl Into<String>, context: PipelineContext) -> Self {
        Self {
            pipeline: pipeline.into(),
            state: ExecutionState::Pending,
            results: Vec::new(),
            started_at: None,
            completed_at: None,
            error: None,
            context,
        }
    }

    /// Path of this log inside `dir`.
    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}-{}.json", self.pipeline, self.context.execution_id))
    }

    /// Save the log as pretty JSON inside `dir`, returning the file path.
    pub fn save(&self, dir: &Path) -> CoreResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = self.log_path(dir);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        debug!("Saved execution log to {:?}", path);
        Ok(path)
    }

    /// Load a log from disk.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Name of the step that failed, if any.
    pub fn failed_step(&self) -> Option<&str> {
        self.results
            .iter()
            .find(|e| !e.result.success)
            .map(|e| e.step.as_str())
    }

    /// Number of times a step ran.
    pub fn runs_of(&self, step: &str) -> usize {
        self.results.iter().filter(|e| e.step == step).count()
    }
}

/// Runs pipelines against a step registry.
pub struct PipelineExecutor {
    registry: Arc<StepRegistry>,
    log_dir: Option<PathBuf>,
}

impl PipelineExecutor {
    /// Create a new executor with the given registry.
    pub fn new(registry: Arc<StepRegistry>) -> Self {
        Self {
            registry,
            log_dir: None,
        }
    }

    /// Persist the execution log into `dir` when the run ends.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Validate and execute a pipeline.
    ///
    /// Stops at the first failing step. The log is persisted (when a log
    /// directory is set) whether the run succeeds or fails; a failed save is
    /// only logged and never replaces the run's outcome.
    pub async fn execute(&self, pipeline: &Pipeline, context: PipelineContext) -> CoreResult<ExecutionLog> {
        validate::validate(pipeline, &self.registry)?;

        let mut log = ExecutionLog::new(&pipeline.name, context);
        log.state = ExecutionState::Running;
        log.started_at = Some(Utc::now());

        info!("Starting pipeline: {} ({})", pipeline.name, log.context.execution_id);

        let outcome = self
            .run_node(&pipeline.root, &mut log.context, &mut log.results)
            .await;

        log.completed_at = Some(Utc::now());
        match &outcome {
            Ok(()) => {
                log.state = ExecutionState::Completed;
                info!("Pipeline '{}' completed ({} steps)", pipeline.name, log.results.len());
            }
            Err(e) => {
                log.state = ExecutionState::Failed;
                log.error = Some(e.to_string());
                error!("Pipeline '{}' failed: {}", pipeline.name, e);
            }
        }

        if let Some(dir) = &self.log_dir {
            if let Err(e) = log.save(dir) {
                warn!("Could not save execution log to {}: {}", dir.display(), e);
            }
        }

        outcome.map(|()| log)
    }

    fn run_node<'a>(
        &'a self,
        node: &'a Node,
        context: &'a mut PipelineContext,
        results: &'a mut Vec<ExecutionLogEntry>,
    ) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            match node {
                Node::Step { name } => self.run_step(name, context, results).await,
                Node::Sequential { name, children } => {
                    debug!("Entering sequential '{}'", name);
                    for child in children {
                        self.run_node(child, context, results).await?;
                        if context.exit_requested() {
                            debug!("Exit requested, leaving '{}' after '{}'", name, child.name());
                            break;
                        }
                    }
                    Ok(())
                }
                Node::Parallel { name, children } => self.run_parallel(name, children, context, results).await,
                Node::Loop {
                    name,
                    body,
                    items_key,
                    active_key,
                    max_iterations,
                } => {
                    let mut iterations = 0usize;
                    loop {
                        if max_iterations.is_some_and(|limit| iterations >= limit) {
                            warn!("Loop '{}' stopped at its limit of {} iterations", name, iterations);
                            break;
                        }
                        let Some(item) = queue::advance(context, items_key, active_key) else {
                            info!("Loop '{}' exhausted after {} iterations", name, iterations);
                            break;
                        };
                        iterations += 1;
                        info!("Loop '{}' iteration {}: {}", name, iterations, item);

                        self.run_node(body, context, results).await?;

                        if context.take_exit_request() {
                            info!("Loop '{}' exited on request after {} iterations", name, iterations);
                            break;
                        }
                    }
                    Ok(())
                }
            }
        })
    }

    async fn run_step(
        &self,
        name: &str,
        context: &mut PipelineContext,
        results: &mut Vec<ExecutionLogEntry>,
    ) -> CoreResult<()> {
        let step = self.registry.get_required(name)?;

        if !step.should_run(context) {
            debug!("Step {} skipped (should_run = false)", name);
            return Ok(());
        }

        info!("Executing step: {}", name);
        let started = Utc::now();

        let result = match step.execute(context).await {
            Ok(result) => result.started(started),
            Err(e) => {
                error!("Step '{}' execution error: {}", name, e);
                results.push(ExecutionLogEntry {
                    step: name.to_string(),
                    result: StepResult::failure(name, e.to_string()).started(started),
                });
                return Err(CoreError::step_failed(name, e.to_string()));
            }
        };

        let success = result.success;
        let message = result.message.clone();
        results.push(ExecutionLogEntry {
            step: name.to_string(),
            result,
        });

        if !success {
            let message = message.unwrap_or_else(|| "Step failed".to_string());
            error!("Step '{}' failed: {}", name, message);
            return Err(CoreError::step_failed(name, message));
        }

        debug!("Step '{}' completed", name);
        Ok(())
    }

    async fn run_parallel(
        &self,
        group: &str,
        children: &[Node],
        context: &mut PipelineContext,
        results: &mut Vec<ExecutionLogEntry>,
    ) -> CoreResult<()> {
        debug!("Entering parallel '{}' with {} branches", group, children.len());
        let before = context.snapshot();

        let branches: Vec<(&Node, PipelineContext)> =
            children.iter().map(|child| (child, context.clone())).collect();

        let outcomes = join_all(branches.into_iter().map(|(child, mut branch_ctx)| async move {
            let mut branch_results = Vec::new();
            let outcome = self.run_node(child, &mut branch_ctx, &mut branch_results).await;
            (child, branch_ctx, branch_results, outcome)
        }))
        .await;

        let mut first_error = None;
        let mut merged: Vec<(String, String)> = Vec::new();
        let mut exit = false;

        let mut settled = Vec::with_capacity(outcomes.len());
        for (child, branch_ctx, branch_results, outcome) in outcomes {
            results.extend(branch_results);
            settled.push((child, branch_ctx, outcome));
        }

        for (child, branch_ctx, outcome) in settled {
            if let Err(e) = outcome {
                if first_error.is_none() {
                    first_error = Some(e);
                }
                continue;
            }

            for key in branch_ctx.changed_keys(&before) {
                if merged.iter().any(|(k, _)| *k == key) {
                    return Err(CoreError::MergeConflict {
                        group: group.to_string(),
                        key,
                    });
                }
                match branch_ctx.value(&key) {
                    Some(value) => context.set(key.clone(), value.clone()),
                    None => {
                        context.remove(&key);
                    }
                }
                merged.push((key, child.name().to_string()));
            }
            exit |= branch_ctx.exit_requested();
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        if exit {
            context.request_exit();
        }

        debug!(
            "Merged {} keys from parallel '{}': {:?}",
            merged.len(),
            group,
            merged.iter().map(|(k, b)| format!("{}<-{}", k, b)).collect::<Vec<_>>()
        );
        Ok(())
    }
}
