//! Pipeline definitions: a tree of sequential, parallel and loop nodes over
//! named leaf steps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::registry::StepRegistry;
use crate::step::StepKeys;

/// A node in the pipeline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Leaf resolved by name in the registry
    Step { name: String },
    /// Children run in order, each seeing the state left by the previous one
    Sequential { name: String, children: Vec<Node> },
    /// Children run concurrently on their own copy of the state
    Parallel { name: String, children: Vec<Node> },
    /// Body runs once per item popped from `items_key`
    Loop {
        name: String,
        body: Box<Node>,
        items_key: String,
        active_key: String,
        max_iterations: Option<usize>,
    },
}

impl Node {
    pub fn step(name: impl Into<String>) -> Self {
        Self::Step { name: name.into() }
    }

    pub fn sequential(name: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::Sequential {
            name: name.into(),
            children: children.into_iter().collect(),
        }
    }

    pub fn parallel(name: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::Parallel {
            name: name.into(),
            children: children.into_iter().collect(),
        }
    }

    /// Loop over the queue under `items_key`, publishing each item under
    /// `active_key` before running `body`.
    pub fn loop_over(
        name: impl Into<String>,
        body: Node,
        items_key: impl Into<String>,
        active_key: impl Into<String>,
    ) -> Self {
        Self::Loop {
            name: name.into(),
            body: Box::new(body),
            items_key: items_key.into(),
            active_key: active_key.into(),
            max_iterations: None,
        }
    }

    /// Bound a loop node. No effect on other node kinds.
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        if let Self::Loop { max_iterations, .. } = &mut self {
            *max_iterations = Some(limit);
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Step { name }
            | Self::Sequential { name, .. }
            | Self::Parallel { name, .. }
            | Self::Loop { name, .. } => name,
        }
    }

    /// Leaf step names in depth-first order.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Step { name } => out.push(name),
            Self::Sequential { children, .. } | Self::Parallel { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            Self::Loop { body, .. } => body.collect_leaves(out),
        }
    }

    /// Union of the keys declared by every leaf below this node.
    ///
    /// Loop nodes also read and write their queue and write the active key.
    pub fn keys(&self, registry: &StepRegistry) -> CoreResult<StepKeys> {
        let mut keys = StepKeys::new();
        match self {
            Self::Step { name } => keys.merge(&registry.get_required(name)?.keys()),
            Self::Sequential { children, .. } | Self::Parallel { children, .. } => {
                for child in children {
                    keys.merge(&child.keys(registry)?);
                }
            }
            Self::Loop {
                body,
                items_key,
                active_key,
                ..
            } => {
                keys.merge(&body.keys(registry)?);
                keys.merge(
                    &StepKeys::new()
                        .reads(items_key.clone())
                        .writes(items_key.clone())
                        .writes(active_key.clone()),
                );
            }
        }
        Ok(keys)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Self::Step { name } => writeln!(f, "{}- {}", indent, name),
            Self::Sequential { name, children } => {
                writeln!(f, "{}{} (sequential)", indent, name)?;
                children.iter().try_for_each(|c| c.fmt_tree(f, depth + 1))
            }
            Self::Parallel { name, children } => {
                writeln!(f, "{}{} (parallel)", indent, name)?;
                children.iter().try_for_each(|c| c.fmt_tree(f, depth + 1))
            }
            Self::Loop {
                name,
                body,
                items_key,
                max_iterations,
                ..
            } => {
                match max_iterations {
                    Some(n) => writeln!(f, "{}{} (loop over '{}', max {})", indent, name, items_key, n)?,
                    None => writeln!(f, "{}{} (loop over '{}')", indent, name, items_key)?,
                }
                body.fmt_tree(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// A named pipeline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Unique pipeline name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Root of the node tree
    pub root: Node,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, root: Node) -> Self {
        Self {
            name: name.into(),
            description: None,
            root,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::sequential(
            "top",
            [
                Node::parallel("fetch", [Node::step("a"), Node::step("b")]),
                Node::loop_over("each", Node::step("c"), "items", "current").with_max_iterations(3),
            ],
        )
    }

    #[test]
    fn test_leaf_names_depth_first() {
        assert_eq!(sample().leaf_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_max_iterations_only_applies_to_loops() {
        assert_eq!(Node::step("a").with_max_iterations(2), Node::step("a"));

        match Node::loop_over("l", Node::step("a"), "i", "c").with_max_iterations(2) {
            Node::Loop { max_iterations, .. } => assert_eq!(max_iterations, Some(2)),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_tree_display() {
        let rendered = sample().to_string();
        assert_eq!(
            rendered,
            "top (sequential)\n  fetch (parallel)\n    - a\n    - b\n  each (loop over 'items', max 3)\n    - c\n"
        );
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let json = serde_json::to_value(Node::step("a")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "step", "name": "a"}));
    }
}
