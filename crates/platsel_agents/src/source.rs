//! Ticket data seams.
//!
//! Agents never talk to Jira or an attachment store directly; they go through
//! a [`TicketSource`]. [`InMemoryTicketSource`] holds the demo data used by
//! the CLI and the tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// Summary and description of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMeta {
    pub summary: String,
    pub description: String,
}

impl IssueMeta {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
        }
    }

    /// Placeholder for issues the source does not know.
    pub fn placeholder() -> Self {
        Self::new("(none)", "(none)")
    }
}

/// Lookups backing the agent tools.
#[cfg_attr(test, mockall::automock)]
pub trait TicketSource: Send + Sync {
    /// Attachment filenames of an epic, in upload order.
    fn attachments(&self, epic: &str) -> Vec<String>;

    /// Markdown content of an attachment.
    fn file_content(&self, filename: &str) -> Option<String>;

    /// Issue metadata of an epic.
    fn issue(&self, epic: &str) -> Option<IssueMeta>;

    /// Epics linked to an epic.
    fn linked_epics(&self, epic: &str) -> Vec<String>;
}

/// In-memory ticket data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryTicketSource {
    #[serde(default)]
    pub attachments: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub files: HashMap<String, String>,
    #[serde(default)]
    pub issues: HashMap<String, IssueMeta>,
    #[serde(default)]
    pub linked: HashMap<String, Vec<String>>,
}

impl InMemoryTicketSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo data for `epic`: two SDD versions and a note, mobile-heavy issue
    /// metadata, and two linked epics.
    pub fn seeded(epic: &str) -> Self {
        Self::new()
            .with_attachments(epic, ["design_SDD_v1.md", "design_SDD_v2.md", "note.txt"])
            .with_file(
                "design_SDD_v2.md",
                "# Service Design Doc (v2)\n\nTargets: iOS, Android, backend API.\n",
            )
            .with_file("design_SDD_v1.md", "# SDD v1\n\nTargets: web only.\n")
            .with_file("note.txt", "random note")
            .with_issue(
                epic,
                IssueMeta::new(
                    "Add push notification service for mobile apps",
                    "Change touches Android/iOS clients; backend gateway updates.",
                ),
            )
            .with_linked(epic, [format!("{}-A", epic), format!("{}-B", epic)])
    }

    /// Load ticket data from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> AgentResult<Self> {
        let content = fs::read_to_string(path)?;
        let source: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| AgentError::config(format!("{}: {}", path.display(), e)))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| AgentError::config(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(AgentError::config(format!(
                    "ticket data must be JSON or YAML: {}",
                    path.display()
                )))
            }
        };
        debug!("Loaded ticket data for {} epics from {}", source.attachments.len(), path.display());
        Ok(source)
    }

    pub fn with_attachments<I, S>(mut self, epic: impl Into<String>, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachments
            .insert(epic.into(), filenames.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_file(mut self, filename: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(filename.into(), content.into());
        self
    }

    pub fn with_issue(mut self, epic: impl Into<String>, meta: IssueMeta) -> Self {
        self.issues.insert(epic.into(), meta);
        self
    }

    pub fn with_linked<I, S>(mut self, epic: impl Into<String>, linked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked
            .insert(epic.into(), linked.into_iter().map(Into::into).collect());
        self
    }
}

impl TicketSource for InMemoryTicketSource {
    fn attachments(&self, epic: &str) -> Vec<String> {
        self.attachments.get(epic).cloned().unwrap_or_default()
    }

    fn file_content(&self, filename: &str) -> Option<String> {
        self.files.get(filename).cloned()
    }

    fn issue(&self, epic: &str) -> Option<IssueMeta> {
        self.issues.get(epic).cloned()
    }

    fn linked_epics(&self, epic: &str) -> Vec<String> {
        self.linked.get(epic).cloned().unwrap_or_default()
    }
}
