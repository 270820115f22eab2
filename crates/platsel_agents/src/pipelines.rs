//! The shipped pipelines and the registry of their leaf agents.

use std::sync::Arc;

use platsel_core::{Node, Pipeline, StepRegistry};

use crate::aggregate::AggregatePlatformsAgent;
use crate::flows::EvalFlowsAgent;
use crate::keys;
use crate::linked::PrepareLoopItemsAgent;
use crate::metadata::MetadataPlatformsAgent;
use crate::model::ModelConfig;
use crate::roles::AgentRole;
use crate::sdd::{NewestSddAgent, SddPlatformsAgent};
use crate::ticket::{ReadFlowInfoAgent, ReadTicketAgent};
use crate::tools::Toolbox;

pub const FLOW_SELECTOR_PIPELINE: &str = "flow_selector_pipeline";
pub const TOP_PIPELINE: &str = "top_pipeline";
pub const LINKED_EPICS_LOOP: &str = "loop_conductor_eval_linked_epics_for_platforms";

/// Pipeline definitions.
pub struct Pipelines;

impl Pipelines {
    /// Evaluate the platforms of `current_epic`.
    pub fn flow_selector() -> Pipeline {
        Pipeline::new(FLOW_SELECTOR_PIPELINE, Self::flow_selector_root())
            .with_description("Determine the platforms affected by the current epic")
    }

    /// Queue the linked epics of `current_epic` and run the flow selector on
    /// each of them.
    pub fn top(max_iterations: Option<usize>) -> Pipeline {
        let mut conductor = Node::loop_over(
            LINKED_EPICS_LOOP,
            Self::flow_selector_root(),
            keys::LOOP_ITEMS,
            keys::CURRENT_EPIC,
        );
        if let Some(limit) = max_iterations {
            conductor = conductor.with_max_iterations(limit);
        }

        Pipeline::new(
            TOP_PIPELINE,
            Node::sequential(
                TOP_PIPELINE,
                [Node::step(AgentRole::PrepareLoopItems.as_str()), conductor],
            ),
        )
        .with_description("Determine the platforms affected by every linked epic")
    }

    /// Pick the pipeline variant.
    pub fn select(use_loop: bool, max_iterations: Option<usize>) -> Pipeline {
        if use_loop {
            Self::top(max_iterations)
        } else {
            Self::flow_selector()
        }
    }

    fn flow_selector_root() -> Node {
        Node::sequential(
            FLOW_SELECTOR_PIPELINE,
            [
                Node::parallel(
                    "info_retrieval",
                    [
                        Node::step(AgentRole::ReadFlowInfo.as_str()),
                        Node::step(AgentRole::ReadTicket.as_str()),
                    ],
                ),
                Node::step(AgentRole::EvalFlows.as_str()),
                Node::parallel(
                    "eval_sdd_and_meta_data_for_platforms",
                    [
                        Node::step(AgentRole::EvalIssueMetaDataForPlatforms.as_str()),
                        Node::sequential(
                            "eval_sdd_for_platforms",
                            [
                                Node::step(AgentRole::GetNewestSddContent.as_str()),
                                Node::step(AgentRole::EvalContentForPlatforms.as_str()),
                            ],
                        ),
                    ],
                ),
                Node::step(AgentRole::AggregatePlatforms.as_str()),
            ],
        )
    }
}

/// Register every leaf agent, sharing one toolbox and model config.
pub fn build_registry(tools: &Toolbox, model: &ModelConfig) -> StepRegistry {
    StepRegistry::new()
        .with(Arc::new(ReadTicketAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(ReadFlowInfoAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(EvalFlowsAgent::new(model.clone())))
        .with(Arc::new(NewestSddAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(SddPlatformsAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(MetadataPlatformsAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(AggregatePlatformsAgent::new(tools.clone(), model.clone())))
        .with(Arc::new(PrepareLoopItemsAgent::new(tools.clone(), model.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryTicketSource;
    use platsel_core::find_issues;

    fn registry() -> StepRegistry {
        let tools = Toolbox::new(Arc::new(InMemoryTicketSource::new()));
        build_registry(&tools, &ModelConfig::default())
    }

    #[test]
    fn test_registry_covers_every_role() {
        let registry = registry();
        assert_eq!(registry.len(), AgentRole::all().len());
        for role in AgentRole::all() {
            assert!(registry.contains(role.as_str()), "missing {}", role);
        }
    }

    #[test]
    fn test_shipped_pipelines_validate() {
        let registry = registry();
        assert!(find_issues(&Pipelines::flow_selector(), &registry).is_empty());
        assert!(find_issues(&Pipelines::top(Some(5)), &registry).is_empty());
    }

    #[test]
    fn test_flow_selector_leaf_order() {
        let pipeline = Pipelines::flow_selector();
        assert_eq!(
            pipeline.root.leaf_names(),
            vec![
                "read_flow_info",
                "read_ticket",
                "eval_flows",
                "eval_issue_meta_data_for_platforms",
                "get_newest_sdd_content",
                "eval_content_for_platforms",
                "aggregate_platforms",
            ]
        );
    }

    #[test]
    fn test_select_variant() {
        assert_eq!(Pipelines::select(false, None).name, FLOW_SELECTOR_PIPELINE);

        let top = Pipelines::select(true, Some(3));
        assert_eq!(top.name, TOP_PIPELINE);
        assert!(top.root.to_string().contains("max 3"));
    }
}
