//! # platsel_core
//!
//! Pipeline composition engine for platsel.
//!
//! This crate provides the session state, the step abstraction, and the
//! executor that runs trees of sequential, parallel and looping steps.
//!
//! # Architecture
//!
//! - **Context**: Session state threaded by `&mut` through one run
//! - **Steps**: Leaf units of work declaring the keys they read and write
//! - **Pipelines**: Trees of sequential, parallel and loop nodes
//! - **Validation**: Rejects parallel branches that share state keys
//! - **Executor**: Runs pipelines and records an execution log
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use platsel_core::{Node, Pipeline, PipelineContext, PipelineExecutor, StepRegistry};
//!
//! let registry = StepRegistry::new().with(Arc::new(MyStep));
//! let executor = PipelineExecutor::new(Arc::new(registry));
//!
//! let pipeline = Pipeline::new(
//!     "demo",
//!     Node::sequential("root", [Node::step("my_step")]),
//! );
//!
//! let log = executor.execute(&pipeline, PipelineContext::new()).await?;
//! ```

pub mod context;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod step;
pub mod validate;

// Re-export main types for convenience
pub use context::{PipelineContext, SessionState};
pub use error::{CoreError, CoreResult};
pub use executor::{ExecutionLog, ExecutionLogEntry, ExecutionState, PipelineExecutor};
pub use pipeline::{Node, Pipeline};
pub use queue::ItemQueue;
pub use registry::StepRegistry;
pub use step::{LogEntry, LogLevel, Step, StepKeys, StepResult};
pub use validate::{find_issues, validate};
