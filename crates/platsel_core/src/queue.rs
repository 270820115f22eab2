//! Work queue backing the loop node and the iteration tools.
//!
//! The pending items live in the session state as a JSON array so a state
//! snapshot shows loop progress. A missing or non-array value reads as an
//! empty queue. Every array element counts towards the length, but only
//! string elements become the active item.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, warn};

use crate::context::PipelineContext;

/// FIFO of pending items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQueue {
    items: VecDeque<Value>,
}

impl ItemQueue {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the queue stored under `key`.
    pub fn load(context: &PipelineContext, key: &str) -> Self {
        match context.value(key) {
            Some(Value::Array(items)) => Self::new(items.iter().cloned()),
            _ => Self::default(),
        }
    }

    /// Write the queue back under `key`.
    pub fn store(&self, context: &mut PipelineContext, key: &str) {
        context.set(key, Value::Array(self.items.iter().cloned().collect()));
    }

    pub fn pop_front(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pop the front item of the queue under `items_key` and make it the active
/// item under `active_key`.
///
/// Non-string entries are dropped with a warning. Returns `None` without
/// touching the state when the queue is empty.
pub fn advance(context: &mut PipelineContext, items_key: &str, active_key: &str) -> Option<String> {
    let mut queue = ItemQueue::load(context, items_key);
    if queue.is_empty() {
        return None;
    }

    let mut next = None;
    while let Some(value) = queue.pop_front() {
        match value {
            Value::String(item) => {
                next = Some(item);
                break;
            }
            other => warn!("Skipping non-string entry {} in '{}'", other, items_key),
        }
    }
    queue.store(context, items_key);

    let item = next?;
    context.set(active_key, Value::String(item.clone()));
    debug!("Advanced '{}' to {} ({} remaining)", items_key, item, queue.len());
    Some(item)
}

/// Number of items left under `key`. Never mutates the state.
pub fn remaining(context: &PipelineContext, key: &str) -> usize {
    ItemQueue::load(context, key).len()
}
