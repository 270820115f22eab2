//! Pipeline context carrying the session state of one run.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreResult;

/// Session state: string keys to arbitrary JSON values.
///
/// Ordered so snapshots print and compare deterministically.
pub type SessionState = BTreeMap<String, Value>;

/// Context threaded by `&mut` through every step of a pipeline run.
///
/// Missing keys read as `None`; steps decide their own defaults. Parallel
/// branches each get a clone and the executor merges what they changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Unique execution ID
    pub execution_id: Uuid,
    /// Session state shared by all steps
    pub state: SessionState,
    /// Set by a step that wants the enclosing loop to stop
    #[serde(default)]
    exit_requested: bool,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            state: SessionState::new(),
            exit_requested: false,
        }
    }

    /// Seed a value.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.state.insert(key.into(), value);
        self
    }

    /// Raw value lookup.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Typed lookup; a value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.state
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Typed lookup falling back to `T::default()`.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).unwrap_or_default()
    }

    /// String lookup without cloning.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.state.get(key).and_then(Value::as_str)
    }

    /// Store a raw value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    /// Serialize and store a value.
    pub fn set_typed<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> CoreResult<()> {
        let json = serde_json::to_value(value)?;
        self.state.insert(key.into(), json);
        Ok(())
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.state.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    /// Copy of the whole session state.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Keys whose value differs from `before`, including removed keys.
    pub fn changed_keys(&self, before: &SessionState) -> Vec<String> {
        let mut changed: Vec<String> = self
            .state
            .iter()
            .filter(|(k, v)| before.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        changed.extend(
            before
                .keys()
                .filter(|k| !self.state.contains_key(*k))
                .cloned(),
        );
        changed.sort();
        changed
    }

    /// Ask the enclosing loop to stop after the current iteration.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Clear a pending exit request, returning whether one was set.
    pub fn take_exit_request(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }
}
