//! Final union of the metadata and SDD platform sets.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use platsel_core::{CoreResult, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::roles::AgentRole;
use crate::tools::Toolbox;

/// Writes `platform_info` for the current epic and records its platforms
/// under `platform_results[epic]`.
pub struct AggregatePlatformsAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl AggregatePlatformsAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::AggregatePlatforms, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for AggregatePlatformsAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new()
            .reads(keys::CURRENT_EPIC)
            .reads(keys::META_EVAL_PLATFORMS)
            .reads(keys::SDD_EVAL_PLATFORMS)
            .reads(keys::PLATFORM_INFO)
            .reads(keys::PLATFORM_RESULTS)
            .writes(keys::PLATFORM_INFO)
            .writes(keys::PLATFORM_RESULTS)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);
        let epic = self.tools.current_epic(context);

        let mut info = Map::new();
        info.insert("epic".to_string(), Value::String(epic.clone()));
        let response = self.tools.store_platform_info(context, Some(info));

        let platforms = response
            .payload
            .get(keys::PLATFORM_INFO)
            .and_then(|record| record.get("platforms"))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));

        let mut results: Map<String, Value> = context.get_or_default(keys::PLATFORM_RESULTS);
        results.insert(epic.clone(), platforms.clone());
        context.set(keys::PLATFORM_RESULTS, Value::Object(results));

        info!("[{}] {} -> {}", self.name(), epic, platforms);
        Ok(result.with_message(format!("{}: {}", epic, platforms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryTicketSource;
    use serde_json::json;
    use std::sync::Arc;

    fn agent() -> AggregatePlatformsAgent {
        let tools = Toolbox::new(Arc::new(InMemoryTicketSource::new()));
        AggregatePlatformsAgent::new(tools, ModelConfig::default())
    }

    #[tokio::test]
    async fn test_aggregate_unions_sources() {
        let mut ctx = PipelineContext::new()
            .with_value(keys::CURRENT_EPIC, json!("PROJ-1"))
            .with_value(keys::META_EVAL_PLATFORMS, json!(["android", "backend", "ios"]))
            .with_value(keys::SDD_EVAL_PLATFORMS, json!(["android", "api", "backend", "ios"]));

        agent().execute(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.value(keys::PLATFORM_INFO),
            Some(&json!({"epic": "PROJ-1", "platforms": ["android", "api", "backend", "ios"]}))
        );
        assert_eq!(
            ctx.value(keys::PLATFORM_RESULTS),
            Some(&json!({"PROJ-1": ["android", "api", "backend", "ios"]}))
        );
    }

    #[tokio::test]
    async fn test_aggregate_keeps_earlier_epics() {
        let agent = agent();
        let mut ctx = PipelineContext::new()
            .with_value(keys::CURRENT_EPIC, json!("PROJ-1-A"))
            .with_value(keys::SDD_EVAL_PLATFORMS, json!(["web"]));
        agent.execute(&mut ctx).await.unwrap();

        ctx.set(keys::CURRENT_EPIC, json!("PROJ-1-B"));
        ctx.set(keys::SDD_EVAL_PLATFORMS, json!(["ios"]));
        agent.execute(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.value(keys::PLATFORM_RESULTS),
            Some(&json!({"PROJ-1-A": ["web"], "PROJ-1-B": ["ios"]}))
        );
        assert_eq!(ctx.value(keys::PLATFORM_INFO).unwrap()["epic"], json!("PROJ-1-B"));
    }
}
