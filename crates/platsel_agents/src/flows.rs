//! Affected-flow evaluation over the retrieved flow hints and ticket content.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;

use platsel_core::{CoreResult, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::platform::{detect_platforms, Platform};
use crate::roles::AgentRole;

/// Text-only agent: lists every platform either signal mentions, with the
/// signal(s) it came from. Writes the list to `platform_flows`.
pub struct EvalFlowsAgent {
    profile: AgentProfile,
}

impl EvalFlowsAgent {
    pub fn new(model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::EvalFlows, model),
        }
    }
}

#[async_trait]
impl Step for EvalFlowsAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new()
            .reads(keys::FLOW_INFO)
            .reads(keys::TICKET_CONTENT)
            .writes(keys::PLATFORM_FLOWS)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let flows = affected_flows(
            context.get_str(keys::FLOW_INFO).unwrap_or_default(),
            context.get_str(keys::TICKET_CONTENT).unwrap_or_default(),
        );
        let count = flows.lines().count();
        context.set(keys::PLATFORM_FLOWS, Value::String(flows));

        Ok(result.with_message(format!("{} affected flows", count)))
    }
}

/// Bullet list of platforms found in either text, e.g. `- ios: flow info, ticket content`.
pub fn affected_flows(flow_info: &str, ticket_content: &str) -> String {
    let known = |text: &str| -> BTreeSet<Platform> {
        detect_platforms(text)
            .into_iter()
            .filter(|p| *p != Platform::Unknown)
            .collect()
    };
    let from_flow = known(flow_info);
    let from_ticket = known(ticket_content);

    if from_flow.is_empty() && from_ticket.is_empty() {
        return "- unknown: no platform named in flow info or ticket content".to_string();
    }

    from_flow
        .union(&from_ticket)
        .map(|platform| {
            let sources: Vec<&str> = [
                (from_flow.contains(platform), "flow info"),
                (from_ticket.contains(platform), "ticket content"),
            ]
            .into_iter()
            .filter_map(|(hit, label)| hit.then_some(label))
            .collect();
            format!("- {}: {}", platform, sources.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_affected_flows_lists_sources() {
        let flows = affected_flows("Platform hints: ios, backend", "Targets: iOS and web");
        assert_eq!(
            flows,
            "- backend: flow info\n- ios: flow info, ticket content\n- web: ticket content"
        );
    }

    #[test]
    fn test_affected_flows_without_platforms() {
        assert_eq!(
            affected_flows("", "nothing here"),
            "- unknown: no platform named in flow info or ticket content"
        );
    }

    #[tokio::test]
    async fn test_eval_flows_writes_output_key() {
        let agent = EvalFlowsAgent::new(ModelConfig::default());
        let mut ctx = PipelineContext::new()
            .with_value(keys::FLOW_INFO, json!("Platform hints: android"))
            .with_value(keys::TICKET_CONTENT, json!("Targets: Android and backend API"));

        let result = agent.execute(&mut ctx).await.unwrap();

        assert_eq!(result.message.as_deref(), Some("3 affected flows"));
        assert_eq!(
            ctx.get_str(keys::PLATFORM_FLOWS),
            Some("- android: flow info, ticket content\n- api: ticket content\n- backend: ticket content")
        );
    }
}
