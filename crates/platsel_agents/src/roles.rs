//! Leaf agent roles.

use serde::{Deserialize, Serialize};

use crate::instructions;
use crate::keys;

/// The leaf agents of the platform selection pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    ReadTicket,
    ReadFlowInfo,
    EvalFlows,
    GetNewestSddContent,
    EvalContentForPlatforms,
    EvalIssueMetaDataForPlatforms,
    AggregatePlatforms,
    PrepareLoopItems,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::ReadTicket => "read_ticket",
            AgentRole::ReadFlowInfo => "read_flow_info",
            AgentRole::EvalFlows => "eval_flows",
            AgentRole::GetNewestSddContent => "get_newest_sdd_content",
            AgentRole::EvalContentForPlatforms => "eval_content_for_platforms",
            AgentRole::EvalIssueMetaDataForPlatforms => "eval_issue_meta_data_for_platforms",
            AgentRole::AggregatePlatforms => "aggregate_platforms",
            AgentRole::PrepareLoopItems => "prepare_loop_items",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::ReadTicket => "Loads the newest SDD of the epic as markdown",
            AgentRole::ReadFlowInfo => "Extracts flow hints from the issue metadata",
            AgentRole::EvalFlows => "Combines flow hints and ticket content into affected flows",
            AgentRole::GetNewestSddContent => "Picks the newest SDD attachment and converts it to markdown",
            AgentRole::EvalContentForPlatforms => "Derives platforms from the SDD content",
            AgentRole::EvalIssueMetaDataForPlatforms => "Derives platforms from the issue metadata",
            AgentRole::AggregatePlatforms => "Unions metadata and SDD platforms for the epic",
            AgentRole::PrepareLoopItems => "Queues the linked epics for evaluation",
        }
    }

    /// Instruction template, rendered against the session state.
    pub fn instruction(&self) -> &'static str {
        match self {
            AgentRole::ReadTicket => instructions::READ_TICKET,
            AgentRole::ReadFlowInfo => instructions::READ_FLOW_INFO,
            AgentRole::EvalFlows => instructions::EVAL_FLOWS,
            AgentRole::GetNewestSddContent => instructions::GET_NEWEST_SDD,
            AgentRole::EvalContentForPlatforms => instructions::EVAL_CONTENT_FOR_PLATFORMS,
            AgentRole::EvalIssueMetaDataForPlatforms => instructions::EVAL_ISSUE_META,
            AgentRole::AggregatePlatforms => instructions::AGGREGATE_PLATFORMS,
            AgentRole::PrepareLoopItems => instructions::PREPARE_LOOP_ITEMS,
        }
    }

    /// Tools the agent calls.
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            AgentRole::ReadTicket => &[
                "get_epic_attachment_filenames",
                "get_attachment_and_convert_to_markdown",
                "get_issue_meta_data",
            ],
            AgentRole::ReadFlowInfo => &["get_issue_meta_data"],
            AgentRole::EvalFlows => &[],
            AgentRole::GetNewestSddContent => &[
                "get_epic_attachment_filenames",
                "get_attachment_and_convert_to_markdown",
            ],
            AgentRole::EvalContentForPlatforms => &["get_affected_platforms", "store_sdd_eval"],
            AgentRole::EvalIssueMetaDataForPlatforms => &["get_issue_meta_data", "store_meta_data_eval"],
            AgentRole::AggregatePlatforms => &["store_platform_info"],
            AgentRole::PrepareLoopItems => &["get_linked_epics", "get_len_state_list"],
        }
    }

    /// Key the agent's final answer is stored under, if any.
    pub fn output_key(&self) -> Option<&'static str> {
        match self {
            AgentRole::ReadTicket => Some(keys::TICKET_CONTENT),
            AgentRole::ReadFlowInfo => Some(keys::FLOW_INFO),
            AgentRole::EvalFlows => Some(keys::PLATFORM_FLOWS),
            AgentRole::GetNewestSddContent => Some(keys::SDD_CONTENT),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            AgentRole::ReadTicket,
            AgentRole::ReadFlowInfo,
            AgentRole::EvalFlows,
            AgentRole::GetNewestSddContent,
            AgentRole::EvalContentForPlatforms,
            AgentRole::EvalIssueMetaDataForPlatforms,
            AgentRole::AggregatePlatforms,
            AgentRole::PrepareLoopItems,
        ]
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_are_unique() {
        let mut names: Vec<_> = AgentRole::all().iter().map(|r| r.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), AgentRole::all().len());
    }

    #[test]
    fn test_role_serde_matches_name() {
        for role in AgentRole::all() {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
        }
    }

    #[test]
    fn test_text_only_agent_has_no_tools() {
        assert!(AgentRole::EvalFlows.tools().is_empty());
        assert_eq!(AgentRole::EvalFlows.output_key(), Some("platform_flows"));
    }
}
