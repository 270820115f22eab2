//! Agent instruction templates and session-state injection.
//!
//! Templates name state keys in braces, e.g. `Current epic: {current_epic}`.
//! Rendering replaces each placeholder with the state value: strings
//! verbatim, other values as compact JSON, missing keys as the empty string.
//! Text in braces that is not a plain identifier is left untouched.

use regex::{Captures, Regex};
use serde_json::Value;

use platsel_core::PipelineContext;

pub const READ_TICKET: &str = "1) Call get_epic_attachment_filenames first.\n\
2) Identify newest SDD.\n\
3) Load exact content via get_attachment_and_convert_to_markdown.\n\
Return only markdown. Current epic: {current_epic}";

pub const READ_FLOW_INFO: &str =
    "Extract flow info hints from the Jira metadata for {current_epic}. Output plain text.";

pub const EVAL_FLOWS: &str = "Using both signals, decide affected flows.\n\n\
flow information:\n{flow_info}\n\n\
ticket content:\n{ticket_content}\n\n\
Return a bullet list 'platform_flows' with one entry per flow and a short reason.";

pub const GET_NEWEST_SDD: &str = "Always call get_epic_attachment_filenames first. If no SDD → reply \
'NO SDD FILES ATTACHED'. If multiple, choose newest. Then convert to markdown. Output key: sdd_content.";

pub const EVAL_CONTENT_FOR_PLATFORMS: &str =
    "From SDD content below, derive platforms and persist via store_sdd_eval.\n\n{sdd_content}";

pub const EVAL_ISSUE_META: &str = "Use Jira metadata only. Persist via store_meta_data_eval.";

pub const AGGREGATE_PLATFORMS: &str =
    "Combine metadata and SDD platforms for {current_epic} via store_platform_info.";

pub const PREPARE_LOOP_ITEMS: &str =
    "Call get_linked_epics to populate 'loop_items'. Optionally call get_len_state_list to log length.";

const PLACEHOLDER: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Fill `{key}` placeholders from the session state.
pub fn render(template: &str, context: &PipelineContext) -> String {
    match Regex::new(PLACEHOLDER) {
        Ok(re) => re
            .replace_all(template, |caps: &Captures| state_text(context, &caps[1]))
            .into_owned(),
        Err(_) => template.to_string(),
    }
}

fn state_text(context: &PipelineContext, key: &str) -> String {
    match context.value(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
