//! Metadata branch: platforms named in the issue summary and description.

use async_trait::async_trait;

use platsel_core::{CoreResult, PipelineContext, Step, StepKeys, StepResult};

use crate::agent::AgentProfile;
use crate::keys;
use crate::model::ModelConfig;
use crate::platform::{detect_platforms, platform_names};
use crate::roles::AgentRole;
use crate::tools::Toolbox;

pub struct MetadataPlatformsAgent {
    profile: AgentProfile,
    tools: Toolbox,
}

impl MetadataPlatformsAgent {
    pub fn new(tools: Toolbox, model: ModelConfig) -> Self {
        Self {
            profile: AgentProfile::new(AgentRole::EvalIssueMetaDataForPlatforms, model),
            tools,
        }
    }
}

#[async_trait]
impl Step for MetadataPlatformsAgent {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn description(&self) -> &str {
        self.profile.role.description()
    }

    fn keys(&self) -> StepKeys {
        StepKeys::new()
            .reads(keys::CURRENT_EPIC)
            .writes(keys::META_EVAL_PLATFORMS)
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StepResult> {
        let result = self.profile.begin(context);

        let response = self.tools.get_issue_meta_data(context);
        let summary: String = response.get("summary").unwrap_or_default();
        let description: String = response.get("description").unwrap_or_default();

        let platforms = platform_names(&detect_platforms(&format!("{}\n{}", summary, description)));
        let stored: Vec<String> = self
            .tools
            .store_meta_data_eval(context, &platforms)
            .get(keys::META_EVAL_PLATFORMS)
            .unwrap_or_default();

        Ok(result.with_message(format!("metadata platforms: {}", stored.join(", "))))
    }
}
