//! # platsel_agents
//!
//! Deterministic agents that decide which platforms (ios, android, web,
//! backend, api) a Jira epic affects.
//!
//! ## Architecture
//!
//! Every leaf agent implements [`platsel_core::Step`]: it renders its
//! instruction against the session state and then performs the tool-call
//! sequence that instruction describes, through a shared [`Toolbox`] backed
//! by a [`TicketSource`].
//!
//! ## Available Agents
//!
//! | Agent | Step | Writes |
//! |-------|------|--------|
//! | [`ReadTicketAgent`] | `read_ticket` | `ticket_content` |
//! | [`ReadFlowInfoAgent`] | `read_flow_info` | `flow_info` |
//! | [`EvalFlowsAgent`] | `eval_flows` | `platform_flows` |
//! | [`NewestSddAgent`] | `get_newest_sdd_content` | `sdd_content` |
//! | [`SddPlatformsAgent`] | `eval_content_for_platforms` | `sdd_eval_platforms` |
//! | [`MetadataPlatformsAgent`] | `eval_issue_meta_data_for_platforms` | `meta_eval_platforms` |
//! | [`AggregatePlatformsAgent`] | `aggregate_platforms` | `platform_info`, `platform_results` |
//! | [`PrepareLoopItemsAgent`] | `prepare_loop_items` | `loop_items` |
//!
//! [`run_pipeline`] wires them into the flow selector pipeline, or into the
//! linked-epic loop when the configuration asks for it.

pub mod agent;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod flows;
pub mod instructions;
pub mod keys;
pub mod linked;
pub mod metadata;
pub mod model;
pub mod pipelines;
pub mod platform;
pub mod roles;
pub mod runner;
pub mod sdd;
pub mod source;
pub mod ticket;
pub mod tools;

pub use agent::AgentProfile;
pub use aggregate::AggregatePlatformsAgent;
pub use config::PipelineConfig;
pub use error::{AgentError, AgentResult};
pub use flows::EvalFlowsAgent;
pub use linked::PrepareLoopItemsAgent;
pub use metadata::MetadataPlatformsAgent;
pub use model::ModelConfig;
pub use pipelines::{build_registry, Pipelines};
pub use platform::{detect_platforms, Platform};
pub use roles::AgentRole;
pub use runner::{run_pipeline, RunReport};
pub use sdd::{NewestSddAgent, SddPlatformsAgent};
pub use source::{InMemoryTicketSource, IssueMeta, TicketSource};
pub use ticket::{ReadFlowInfoAgent, ReadTicketAgent};
pub use tools::{ToolResponse, ToolStatus, Toolbox};
