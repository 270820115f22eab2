//! Tool functions available to the agents.
//!
//! Every tool takes the pipeline context plus optional arguments and returns
//! a [`ToolResponse`] carrying a `status` and a tool-specific payload. Lookups
//! never fail: absent data reads as empty lists or placeholder text.

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use platsel_core::{queue, PipelineContext};

use crate::keys;
use crate::platform::{detect_platforms, normalize_platforms, platform_names};
use crate::source::{IssueMeta, TicketSource};

/// Outcome signal of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    /// Iteration exhausted
    Done,
    /// Explicit request to leave the enclosing loop
    Exit,
}

/// Status plus payload, serialized flat: `{"status": "success", "filenames": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ToolResponse {
    pub fn new(status: ToolStatus) -> Self {
        Self {
            status,
            payload: Map::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(ToolStatus::Success)
    }

    pub fn done() -> Self {
        Self::new(ToolStatus::Done)
    }

    pub fn exit() -> Self {
        Self::new(ToolStatus::Exit)
    }

    /// Add a payload field.
    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Self {
        if let Ok(json) = serde_json::to_value(value) {
            self.payload.insert(key.into(), json);
        }
        self
    }

    /// Typed payload lookup.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.payload
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Placeholder markdown for attachments the source does not have.
pub fn placeholder_markdown(filename: &str) -> String {
    format!("# MOCK SDD\n\nFile: {}\n\n(No real content found.)", filename)
}

/// Pick the newest SDD among `filenames`.
///
/// Candidates contain "sdd" in any case. The highest `_v<N>` version wins,
/// reading the last such marker in a name. Unversioned names count as
/// version 0 and ties go to the later attachment.
pub fn select_newest_sdd(filenames: &[String]) -> Option<&str> {
    let version_re = Regex::new(r"(?i)_v(\d+)").ok();

    filenames
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains("sdd"))
        .max_by_key(|(index, name)| {
            let version = version_re
                .as_ref()
                .and_then(|re| re.captures_iter(name).last())
                .and_then(|caps| caps[1].parse::<u64>().ok())
                .unwrap_or(0);
            (version, *index)
        })
        .map(|(_, name)| name.as_str())
}

/// Tool functions bound to a ticket data source.
#[derive(Clone)]
pub struct Toolbox {
    source: Arc<dyn TicketSource>,
}

impl Toolbox {
    pub fn new(source: Arc<dyn TicketSource>) -> Self {
        Self { source }
    }

    /// Active epic, or `EPIC-UNKNOWN`.
    pub fn current_epic(&self, context: &PipelineContext) -> String {
        context
            .get_str(keys::CURRENT_EPIC)
            .unwrap_or(keys::UNKNOWN_EPIC)
            .to_string()
    }

    /// Attachment filenames of the active epic.
    pub fn attachment_filenames(&self, context: &PipelineContext) -> Vec<String> {
        self.source.attachments(&self.current_epic(context))
    }

    /// Issue metadata of the active epic, or the `(none)` placeholder.
    pub fn issue_meta(&self, context: &PipelineContext) -> IssueMeta {
        let epic = self.current_epic(context);
        self.source.issue(&epic).unwrap_or_else(|| {
            warn!("No issue metadata for {}", epic);
            IssueMeta::placeholder()
        })
    }

    /// Markdown of an attachment, or a placeholder. Publishes the content
    /// under `sdd_content`.
    pub fn load_markdown(&self, context: &mut PipelineContext, filename: &str) -> String {
        let content = self.source.file_content(filename).unwrap_or_else(|| {
            warn!("No content registered for {}", filename);
            placeholder_markdown(filename)
        });
        context.set(keys::SDD_CONTENT, Value::String(content.clone()));
        content
    }

    pub fn get_epic_attachment_filenames(&self, context: &PipelineContext) -> ToolResponse {
        ToolResponse::success().with("filenames", &self.attachment_filenames(context))
    }

    pub fn get_attachment_and_convert_to_markdown(
        &self,
        context: &mut PipelineContext,
        filename: &str,
    ) -> ToolResponse {
        let markdown = self.load_markdown(context, filename);
        ToolResponse::success().with("markdown", &markdown)
    }

    pub fn get_issue_meta_data(&self, context: &PipelineContext) -> ToolResponse {
        let meta = self.issue_meta(context);
        ToolResponse::success()
            .with("summary", &meta.summary)
            .with("description", &meta.description)
    }

    /// Detect platforms in `sdd_content` (source `"sdd"`) or in
    /// `ticket_content` (any other source).
    pub fn get_affected_platforms(&self, context: &PipelineContext, source: &str) -> ToolResponse {
        let key = if source == "sdd" {
            keys::SDD_CONTENT
        } else {
            keys::TICKET_CONTENT
        };
        let text = context.get_str(key).unwrap_or_default();
        ToolResponse::success().with("platforms", &platform_names(&detect_platforms(text)))
    }

    pub fn store_meta_data_eval(&self, context: &mut PipelineContext, platforms: &[String]) -> ToolResponse {
        let stored = store_platform_list(context, keys::META_EVAL_PLATFORMS, platforms);
        ToolResponse::success().with(keys::META_EVAL_PLATFORMS, &stored)
    }

    pub fn store_sdd_eval(&self, context: &mut PipelineContext, platforms: &[String]) -> ToolResponse {
        let stored = store_platform_list(context, keys::SDD_EVAL_PLATFORMS, platforms);
        ToolResponse::success().with(keys::SDD_EVAL_PLATFORMS, &stored)
    }

    /// Union the metadata and SDD platform sets into `platform_info`.
    ///
    /// Fields stored by an earlier call are kept, `info` fields override
    /// them, and `platforms` is always the freshly computed union.
    pub fn store_platform_info(
        &self,
        context: &mut PipelineContext,
        info: Option<Map<String, Value>>,
    ) -> ToolResponse {
        let meta: Vec<String> = context.get_or_default(keys::META_EVAL_PLATFORMS);
        let sdd: Vec<String> = context.get_or_default(keys::SDD_EVAL_PLATFORMS);
        let union: BTreeSet<String> = meta.into_iter().chain(sdd).collect();

        let mut record = match context.value(keys::PLATFORM_INFO) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        record.extend(info.unwrap_or_default());
        record.insert(
            "platforms".to_string(),
            Value::from(union.into_iter().collect::<Vec<_>>()),
        );

        let record = Value::Object(record);
        context.set(keys::PLATFORM_INFO, record.clone());
        ToolResponse::success().with(keys::PLATFORM_INFO, &record)
    }

    /// Linked epics of the active epic, also queued under `loop_items`.
    pub fn get_linked_epics(&self, context: &mut PipelineContext) -> ToolResponse {
        let linked = self.source.linked_epics(&self.current_epic(context));
        context.set(keys::LOOP_ITEMS, Value::from(linked.clone()));
        debug!("Queued {} linked epics", linked.len());
        ToolResponse::success().with("items", &linked)
    }

    /// Remaining items under `key` (default `loop_items`).
    pub fn get_len_state_list(&self, context: &PipelineContext, key: Option<&str>) -> ToolResponse {
        let length = queue::remaining(context, key.unwrap_or(keys::LOOP_ITEMS));
        ToolResponse::success().with("length", &length)
    }

    /// Pop the next item under `key` (default `loop_items`) into
    /// `current_epic`; `done` when the list is empty.
    pub fn get_next_state_list_item(&self, context: &mut PipelineContext, key: Option<&str>) -> ToolResponse {
        match queue::advance(context, key.unwrap_or(keys::LOOP_ITEMS), keys::CURRENT_EPIC) {
            Some(item) => ToolResponse::success().with("item", &item),
            None => ToolResponse::done().with("item", &Value::Null),
        }
    }

    /// Ask the enclosing loop to stop.
    pub fn exit_loop(&self, context: &mut PipelineContext) -> ToolResponse {
        context.request_exit();
        ToolResponse::exit()
    }
}

fn store_platform_list(context: &mut PipelineContext, key: &str, platforms: &[String]) -> Vec<String> {
    let stored = normalize_platforms(platforms);
    context.set(key, Value::from(stored.clone()));
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InMemoryTicketSource, MockTicketSource};
    use serde_json::json;

    fn toolbox() -> Toolbox {
        Toolbox::new(Arc::new(InMemoryTicketSource::seeded("PROJ-1")))
    }

    fn ctx(epic: &str) -> PipelineContext {
        PipelineContext::new().with_value(keys::CURRENT_EPIC, json!(epic))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_response_serializes_flat() {
        let response = ToolResponse::success().with("length", &2);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "success", "length": 2})
        );
    }

    #[test]
    fn test_attachment_filenames() {
        let tools = toolbox();

        let response = tools.get_epic_attachment_filenames(&ctx("PROJ-1"));
        assert_eq!(response.status, ToolStatus::Success);
        assert_eq!(response.get::<Vec<String>>("filenames").unwrap().len(), 3);

        let unknown = tools.get_epic_attachment_filenames(&PipelineContext::new());
        assert_eq!(unknown.get::<Vec<String>>("filenames"), Some(vec![]));
    }

    #[test]
    fn test_markdown_publishes_sdd_content() {
        let tools = toolbox();
        let mut ctx = ctx("PROJ-1");

        let response = tools.get_attachment_and_convert_to_markdown(&mut ctx, "design_SDD_v1.md");
        assert_eq!(response.get::<String>("markdown").as_deref(), Some("# SDD v1\n\nTargets: web only.\n"));
        assert_eq!(ctx.get_str(keys::SDD_CONTENT), Some("# SDD v1\n\nTargets: web only.\n"));

        tools.get_attachment_and_convert_to_markdown(&mut ctx, "ghost.md");
        assert_eq!(
            ctx.get_str(keys::SDD_CONTENT),
            Some("# MOCK SDD\n\nFile: ghost.md\n\n(No real content found.)")
        );
    }

    #[test]
    fn test_issue_meta_placeholder() {
        let response = toolbox().get_issue_meta_data(&ctx("NOPE-1"));
        assert_eq!(response.get::<String>("summary").as_deref(), Some("(none)"));
        assert_eq!(response.get::<String>("description").as_deref(), Some("(none)"));
    }

    #[test]
    fn test_affected_platforms_by_source() {
        let tools = toolbox();
        let ctx = PipelineContext::new()
            .with_value(keys::SDD_CONTENT, json!("iOS and web"))
            .with_value(keys::TICKET_CONTENT, json!("backend only"));

        let sdd = tools.get_affected_platforms(&ctx, "sdd");
        assert_eq!(sdd.get::<Vec<String>>("platforms"), Some(strings(&["ios", "web"])));

        let ticket = tools.get_affected_platforms(&ctx, "ticket");
        assert_eq!(ticket.get::<Vec<String>>("platforms"), Some(strings(&["backend"])));

        let empty = tools.get_affected_platforms(&PipelineContext::new(), "sdd");
        assert_eq!(empty.get::<Vec<String>>("platforms"), Some(strings(&["unknown"])));
    }

    #[test]
    fn test_platform_info_is_sorted_union() {
        let tools = toolbox();
        let mut ctx = PipelineContext::new();
        tools.store_meta_data_eval(&mut ctx, &strings(&["ios"]));
        tools.store_sdd_eval(&mut ctx, &strings(&["backend", "ios"]));

        tools.store_platform_info(&mut ctx, None);

        assert_eq!(
            ctx.value(keys::PLATFORM_INFO),
            Some(&json!({"platforms": ["backend", "ios"]}))
        );
    }

    #[test]
    fn test_platform_info_is_idempotent() {
        let tools = toolbox();
        let mut ctx = PipelineContext::new();
        tools.store_meta_data_eval(&mut ctx, &strings(&["android", "ios"]));
        tools.store_sdd_eval(&mut ctx, &strings(&["api"]));

        let mut info = Map::new();
        info.insert("epic".to_string(), json!("PROJ-1"));

        let first = tools.store_platform_info(&mut ctx, Some(info.clone()));
        let second = tools.store_platform_info(&mut ctx, Some(info));
        assert_eq!(first, second);
    }

    #[test]
    fn test_platform_info_merges_previous_fields() {
        let tools = toolbox();
        let mut ctx = PipelineContext::new();
        tools.store_sdd_eval(&mut ctx, &strings(&["web"]));

        let mut first = Map::new();
        first.insert("epic".to_string(), json!("PROJ-1"));
        first.insert("reviewed".to_string(), json!(false));
        tools.store_platform_info(&mut ctx, Some(first));

        let mut second = Map::new();
        second.insert("reviewed".to_string(), json!(true));
        second.insert("platforms".to_string(), json!(["bogus"]));
        tools.store_platform_info(&mut ctx, Some(second));

        assert_eq!(
            ctx.value(keys::PLATFORM_INFO),
            Some(&json!({"epic": "PROJ-1", "reviewed": true, "platforms": ["web"]}))
        );
    }

    #[test]
    fn test_store_eval_normalizes() {
        let tools = toolbox();
        let mut ctx = PipelineContext::new();

        let response = tools.store_meta_data_eval(&mut ctx, &strings(&["iOS", "backend", "ios"]));
        assert_eq!(
            response.get::<Vec<String>>(keys::META_EVAL_PLATFORMS),
            Some(strings(&["backend", "ios"]))
        );
        assert_eq!(ctx.value(keys::META_EVAL_PLATFORMS), Some(&json!(["backend", "ios"])));
    }

    #[test]
    fn test_loop_tools() {
        let tools = toolbox();
        let mut ctx = ctx("PROJ-1");

        let linked = tools.get_linked_epics(&mut ctx);
        assert_eq!(linked.get::<Vec<String>>("items"), Some(strings(&["PROJ-1-A", "PROJ-1-B"])));
        assert_eq!(tools.get_len_state_list(&ctx, None).get::<usize>("length"), Some(2));

        let next = tools.get_next_state_list_item(&mut ctx, None);
        assert_eq!(next.status, ToolStatus::Success);
        assert_eq!(next.get::<String>("item").as_deref(), Some("PROJ-1-A"));
        assert_eq!(ctx.get_str(keys::CURRENT_EPIC), Some("PROJ-1-A"));
        assert_eq!(tools.get_len_state_list(&ctx, None).get::<usize>("length"), Some(1));

        tools.get_next_state_list_item(&mut ctx, None);
        let done = tools.get_next_state_list_item(&mut ctx, None);
        assert_eq!(done.status, ToolStatus::Done);
        assert_eq!(done.payload.get("item"), Some(&Value::Null));
        assert_eq!(ctx.get_str(keys::CURRENT_EPIC), Some("PROJ-1-B"));
    }

    #[test]
    fn test_exit_loop() {
        let mut ctx = PipelineContext::new();
        let response = toolbox().exit_loop(&mut ctx);
        assert_eq!(response.status, ToolStatus::Exit);
        assert!(ctx.exit_requested());
    }

    #[test]
    fn test_select_newest_sdd() {
        let names = strings(&["design_SDD_v1.md", "design_SDD_v2.md", "note.txt"]);
        assert_eq!(select_newest_sdd(&names), Some("design_SDD_v2.md"));

        let reversed = strings(&["design_SDD_v10.md", "design_SDD_v9.md"]);
        assert_eq!(select_newest_sdd(&reversed), Some("design_SDD_v10.md"));

        let unversioned = strings(&["old_sdd.md", "new_sdd.md"]);
        assert_eq!(select_newest_sdd(&unversioned), Some("new_sdd.md"));

        assert_eq!(select_newest_sdd(&strings(&["note.txt"])), None);

        let nested = strings(&["design_v2_SDD_v10.md", "design_v3_SDD_v9.md"]);
        assert_eq!(select_newest_sdd(&nested), Some("design_v2_SDD_v10.md"));
    }

    #[test]
    fn test_tools_query_source_with_current_epic() {
        let mut source = MockTicketSource::new();
        source
            .expect_attachments()
            .times(1)
            .returning(|epic| vec![format!("{}_SDD.md", epic)]);
        let tools = Toolbox::new(Arc::new(source));

        let response = tools.get_epic_attachment_filenames(&PipelineContext::new());
        assert_eq!(
            response.get::<Vec<String>>("filenames"),
            Some(strings(&["EPIC-UNKNOWN_SDD.md"]))
        );
    }
}
