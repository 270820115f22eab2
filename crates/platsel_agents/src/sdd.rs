//! SDD branch: newest SDD content and the platforms it names.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use platsel_core::{CoreResult, LogEntry, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::roles::AgentRole;
use crate::tools::{select_newest_sdd, Toolbox};

/// Stored under `sdd_content` when the epic has no SDD.
pub const NO_SDD_ATTACHED: &str = "NO SDD FILES ATTACHED";

pub struct NewestSddAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl NewestSddAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::GetNewestSddContent, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for NewestSddAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new().reads(keys::CURRENT_EPIC).writes(keys::SDD_CONTENT)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let filenames: Vec<String> = self
            .tools
            .get_epic_attachment_filenames(context)
            .get("filenames")
            .unwrap_or_default();

        match select_newest_sdd(&filenames) {
            Some(filename) => {
                info!("[{}] Newest SDD: {}", self.name(), filename);
                self.tools.get_attachment_and_convert_to_markdown(context, filename);
                Ok(result.with_message(format!("newest SDD: {}", filename)))
            }
            None => {
                warn!("[{}] No SDD among {} attachments", self.name(), filenames.len());
                context.set(keys::SDD_CONTENT, Value::String(NO_SDD_ATTACHED.to_string()));
                Ok(result
                    .with_message(NO_SDD_ATTACHED)
                    .with_log(LogEntry::warn(NO_SDD_ATTACHED)))
            }
        }
    }
}

/// Stores the platforms named in `sdd_content` as `sdd_eval_platforms`.
pub struct SddPlatformsAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl SddPlatformsAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::EvalContentForPlatforms, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for SddPlatformsAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new()
            .reads(keys::SDD_CONTENT)
            .writes(keys::SDD_EVAL_PLATFORMS)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let platforms: Vec<String> = self
            .tools
            .get_affected_platforms(context, "sdd")
            .get("platforms")
            .unwrap_or_default();
        let stored: Vec<String> = self
            .tools
            .store_sdd_eval(context, &platforms)
            .get(keys::SDD_EVAL_PLATFORMS)
            .unwrap_or_default();

        Ok(result.with_message(format!("sdd platforms: {}", stored.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryTicketSource;
    use serde_json::json;
    use std::sync::Arc;

    fn tools() -> Toolbox {
        Toolbox::new(Arc::new(InMemoryTicketSource::seeded("PROJ-1")))
    }

    #[tokio::test]
    async fn test_newest_sdd_prefers_v2() {
        let agent = NewestSddAgent::new(tools(), ModelConfig::default());
        let mut ctx = PipelineContext::new().with_value(keys::CURRENT_EPIC, json!("PROJ-1"));

        let result = agent.execute(&mut ctx).await.unwrap();

        assert_eq!(result.message.as_deref(), Some("newest SDD: design_SDD_v2.md"));
        assert!(ctx.get_str(keys::SDD_CONTENT).unwrap().contains("(v2)"));
    }

    #[tokio::test]
    async fn test_newest_sdd_without_attachments() {
        let agent = NewestSddAgent::new(tools(), ModelConfig::default());
        let mut ctx = PipelineContext::new()
            .with_value(keys::CURRENT_EPIC, json!("PROJ-2"))
            .with_value(keys::SDD_CONTENT, json!("stale content"));

        agent.execute(&mut ctx).await.unwrap();

        assert_eq!(ctx.get_str(keys::SDD_CONTENT), Some(NO_SDD_ATTACHED));
    }

    #[tokio::test]
    async fn test_sdd_platforms_stored_sorted() {
        let agent = SddPlatformsAgent::new(tools(), ModelConfig::default());
        let mut ctx = PipelineContext::new().with_value(
            keys::SDD_CONTENT,
            json!("# Service Design Doc (v2)\n\nTargets: iOS, Android, backend API.\n"),
        );

        agent.execute(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.value(keys::SDD_EVAL_PLATFORMS),
            Some(&json!(["android", "api", "backend", "ios"]))
        );
    }

    #[tokio::test]
    async fn test_sdd_platforms_unknown_without_keywords() {
        let agent = SddPlatformsAgent::new(tools(), ModelConfig::default());
        let mut ctx = PipelineContext::new().with_value(keys::SDD_CONTENT, json!(NO_SDD_ATTACHED));

        agent.execute(&mut ctx).await.unwrap();

        assert_eq!(ctx.value(keys::SDD_EVAL_PLATFORMS), Some(&json!(["unknown"])));
    }
}
