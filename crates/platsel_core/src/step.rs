//! Step definitions and execution results.
//!
//! Steps are the leaves of a pipeline. Each step reads some keys of the
//! session state, does its work, and writes its result keys back.
//!
//! # Step Lifecycle
//!
//! 1. **Registration**: Steps are registered with a `StepRegistry` by name.
//! 2. **Validation**: The declared read and write keys of every step are
//!    checked for collisions between parallel branches.
//! 3. **Execution**: The step's `execute` method is called with a mutable context.
//! 4. **Result**: The step returns a `StepResult` indicating success or failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use platsel_core::{CoreResult, PipelineContext, Step, StepKeys, StepResult};
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Step for Greeter {
//!     fn name(&self) -> &str { "greeter" }
//!     fn description(&self) -> &str { "Writes a greeting" }
//!     fn keys(&self) -> StepKeys { StepKeys::new().writes("greeting") }
//!
//!     async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
//!         context.set("greeting", "hello".into());
//!         Ok(StepResult::success("greeter"))
//!     }
//! }
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::PipelineContext;
use crate::error::CoreResult;

/// State keys a step reads and writes.
///
/// Parallel branches are only allowed to run when their key sets do not
/// overlap, so these declarations must be complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepKeys {
    pub reads: BTreeSet<String>,
    pub writes: BTreeSet<String>,
}

impl StepKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(mut self, key: impl Into<String>) -> Self {
        self.reads.insert(key.into());
        self
    }

    pub fn writes(mut self, key: impl Into<String>) -> Self {
        self.writes.insert(key.into());
        self
    }

    /// Union with another key set.
    pub fn merge(&mut self, other: &StepKeys) {
        self.reads.extend(other.reads.iter().cloned());
        self.writes.extend(other.writes.iter().cloned());
    }
}

/// Result from step execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub success: bool,
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub logs: Vec<LogEntry>,
}

impl StepResult {
    pub fn success(step: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            step: step.into(),
            success: true,
            message: None,
            started_at: now,
            completed_at: now,
            logs: Vec::new(),
        }
    }

    pub fn failure(step: impl Into<String>, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            step: step.into(),
            success: false,
            message: Some(message.into()),
            started_at: now,
            completed_at: now,
            logs: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_log(mut self, entry: LogEntry) -> Self {
        self.logs.push(entry);
        self
    }

    /// Stamp the start time, keeping the completion time.
    pub fn started(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = at;
        self
    }
}

/// A log entry from step execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn debug(message: impl Into<String>) -> Self {
        Self::at(LogLevel::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::at(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::at(LogLevel::Warn, message)
    }

    fn at(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Trait for leaf step implementations.
///
/// # Thread Safety
///
/// Steps must be `Send + Sync`: parallel branches execute them concurrently,
/// each against its own copy of the context.
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique step name, used to look the step up in the registry.
    fn name(&self) -> &str;

    /// Human-readable description of the step.
    fn description(&self) -> &str;

    /// Declare the state keys this step reads and writes.
    fn keys(&self) -> StepKeys;

    /// Execute the step against the session state.
    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult>;

    /// Check if the step should run given the context.
    ///
    /// Default: always run.
    fn should_run(&self, _context: &PipelineContext) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_keys_merge() {
        let mut keys = StepKeys::new().reads("a").writes("b");
        keys.merge(&StepKeys::new().reads("c").writes("b"));

        assert_eq!(keys.reads.len(), 2);
        assert_eq!(keys.writes.len(), 1);
        assert!(keys.reads.contains("c"));
    }

    #[test]
    fn test_step_result_builders() {
        let ok = StepResult::success("read").with_log(LogEntry::info("done"));
        assert!(ok.success);
        assert_eq!(ok.logs.len(), 1);

        let failed = StepResult::failure("read", "no data");
        assert!(!failed.success);
        assert_eq!(failed.message.as_deref(), Some("no data"));
    }
}
