//! Shared agent profile.
//!
//! Every leaf agent pairs an [`AgentProfile`] (role, model settings) with a
//! [`Toolbox`](crate::tools::Toolbox). The profile renders the role's
//! instruction against the session state and starts the step result, so the
//! agents themselves only contain their tool-call sequence.

use tracing::debug;

use platsel_core::{LogEntry, PipelineContext, StepResult};

use crate::instructions;
use crate::model::ModelConfig;
use crate::roles::AgentRole;

#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub role: AgentRole,
    pub model: ModelConfig,
}

impl AgentProfile {
    pub fn new(role: AgentRole, model: ModelConfig) -> Self {
        Self { role, model }
    }

    pub fn name(&self) -> &'static str {
        self.role.as_str()
    }

    /// Instruction with the current session state injected.
    pub fn render_instruction(&self, context: &PipelineContext) -> String {
        let rendered = instructions::render(self.role.instruction(), context);
        debug!("[{}] model={} instruction:\n{}", self.name(), self.model.model, rendered);
        rendered
    }

    /// Start a successful result carrying the rendered instruction.
    pub fn begin(&self, context: &PipelineContext) -> StepResult {
        let instruction = self.render_instruction(context);
        StepResult::success(self.name()).with_log(LogEntry::debug(instruction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_begin_logs_rendered_instruction() {
        let profile = AgentProfile::new(AgentRole::ReadFlowInfo, ModelConfig::default());
        let ctx = PipelineContext::new().with_value("current_epic", json!("PROJ-3"));

        let result = profile.begin(&ctx);

        assert!(result.success);
        assert_eq!(result.step, "read_flow_info");
        assert!(result.logs[0].message.contains("PROJ-3"));
    }
}
