//! Loop preparation: queue the linked epics.

use async_trait::async_trait;

use platsel_core::{CoreResult, LogEntry, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::roles::AgentRole;
use crate::tools::Toolbox;

pub struct PrepareLoopItemsAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl PrepareLoopItemsAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::PrepareLoopItems, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for PrepareLoopItemsAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new().reads(keys::CURRENT_EPIC).writes(keys::LOOP_ITEMS)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let items: Vec<String> = self.tools.get_linked_epics(context).get("items").unwrap_or_default();
        let length: usize = self
            .tools
            .get_len_state_list(context, None)
            .get("length")
            .unwrap_or_default();

        Ok(result
            .with_log(LogEntry::info(format!("Queued: {}", items.join(", "))))
            .with_message(format!("{} linked epics queued", length)))
    }
}
