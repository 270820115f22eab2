//! Information retrieval agents: ticket content and flow hints.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use platsel_core::{CoreResult, LogEntry, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::platform::{detect_platforms, platform_names};
use crate::roles::AgentRole;
use crate::tools::{select_newest_sdd, Toolbox};

/// Loads the newest SDD as the ticket content.
///
/// Falls back to a metadata summary when the epic has no SDD attached.
pub struct ReadTicketAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl ReadTicketAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::ReadTicket, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for ReadTicketAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new()
            .reads(keys::CURRENT_EPIC)
            .writes(keys::TICKET_CONTENT)
            .writes(keys::SDD_CONTENT)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let mut result = self.profile.begin(context);

        let filenames: Vec<String> = self
            .tools
            .get_epic_attachment_filenames(context)
            .get("filenames")
            .unwrap_or_default();

        let content = match select_newest_sdd(&filenames) {
            Some(filename) => {
                info!("[{}] Loading {}", self.name(), filename);
                result = result.with_log(LogEntry::info(format!("Loaded {}", filename)));
                self.tools
                    .get_attachment_and_convert_to_markdown(context, filename)
                    .get::<String>("markdown")
                    .unwrap_or_default()
            }
            None => {
                let epic = self.tools.current_epic(context);
                warn!("[{}] No SDD attached to {}, using issue metadata", self.name(), epic);
                result = result.with_log(LogEntry::warn(format!("No SDD attached to {}", epic)));
                let meta = self.tools.issue_meta(context);
                format!("# {}\n\n{}\n", meta.summary, meta.description)
            }
        };

        context.set(keys::TICKET_CONTENT, Value::String(content));
        Ok(result)
    }
}

/// Extracts plain-text flow hints from the issue metadata.
pub struct ReadFlowInfoAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl ReadFlowInfoAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::ReadFlowInfo, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for ReadFlowInfoAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new().reads(keys::CURRENT_EPIC).writes(keys::FLOW_INFO)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let response = self.tools.get_issue_meta_data(context);
        let summary: String = response.get("summary").unwrap_or_default();
        let description: String = response.get("description").unwrap_or_default();
        let hints = platform_names(&detect_platforms(&format!("{}\n{}", summary, description)));

        let flow_info = format!(
            "Summary: {}\nDescription: {}\nPlatform hints: {}",
            summary,
            description,
            hints.join(", ")
        );
        context.set(keys::FLOW_INFO, Value::String(flow_info));

        Ok(result.with_message(format!("platform hints: {}", hints.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryTicketSource;
    use serde_json::json;
    use std::sync::Arc;

    fn tools(source: InMemoryTicketSource) -> Toolbox {
        Toolbox::new(Arc::new(source))
    }

    fn ctx(epic: &str) -> PipelineContext {
        PipelineContext::new().with_value(keys::CURRENT_EPIC, json!(epic))
    }

    #[tokio::test]
    async fn test_read_ticket_loads_newest_sdd() {
        let agent = ReadTicketAgent::new(tools(InMemoryTicketSource::seeded("PROJ-1")), ModelConfig::default());
        let mut ctx = ctx("PROJ-1");

        let result = agent.execute(&mut ctx).await.unwrap();

        assert!(result.success);
        let content = ctx.get_str(keys::TICKET_CONTENT).unwrap();
        assert!(content.starts_with("# Service Design Doc (v2)"));
        assert_eq!(ctx.get_str(keys::SDD_CONTENT), Some(content));
    }

    #[tokio::test]
    async fn test_read_ticket_falls_back_to_metadata() {
        let agent = ReadTicketAgent::new(tools(InMemoryTicketSource::seeded("PROJ-1")), ModelConfig::default());
        let mut ctx = ctx("PROJ-1-A");

        agent.execute(&mut ctx).await.unwrap();

        assert_eq!(ctx.get_str(keys::TICKET_CONTENT), Some("# (none)\n\n(none)\n"));
        assert!(!ctx.contains(keys::SDD_CONTENT));
    }

    #[tokio::test]
    async fn test_read_flow_info() {
        let agent = ReadFlowInfoAgent::new(tools(InMemoryTicketSource::seeded("PROJ-1")), ModelConfig::default());
        let mut ctx = ctx("PROJ-1");

        agent.execute(&mut ctx).await.unwrap();

        let flow_info = ctx.get_str(keys::FLOW_INFO).unwrap();
        assert!(flow_info.starts_with("Summary: Add push notification service"));
        assert!(flow_info.ends_with("Platform hints: android, backend, ios"));
    }
}
