//! Step registry for managing step implementations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::step::Step;

/// A registry of step implementations keyed by name.
#[derive(Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Register a step under its `name()`.
    ///
    /// A step with the same name is replaced.
    pub fn register(&mut self, step: Arc<dyn Step>) {
        let name = step.name().to_string();
        debug!("Registering step: {}", name);
        self.steps.insert(name, step);
    }

    /// Builder-style registration.
    pub fn with(mut self, step: Arc<dyn Step>) -> Self {
        self.register(step);
        self
    }

    /// Get a step by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    /// Get a step by name, returning an error if not found.
    pub fn get_required(&self, name: &str) -> CoreResult<Arc<dyn Step>> {
        self.get(name)
            .ok_or_else(|| CoreError::StepNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// All registered step names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.steps.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PipelineContext;
    use crate::step::{StepKeys, StepResult};
    use async_trait::async_trait;

    struct TestStep {
        name: String,
    }

    #[async_trait]
    impl Step for TestStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "Test step"
        }

        fn keys(&self) -> StepKeys {
            StepKeys::default()
        }

        async fn execute(&self, _context: &mut PipelineContext) -> CoreResult<StepResult> {
            Ok(StepResult::success(&self.name))
        }
    }

    fn step(name: &str) -> Arc<dyn Step> {
        Arc::new(TestStep {
            name: name.to_string(),
        })
    }

    #[test]
    fn test_registry_register_and_get() {
        let registry = StepRegistry::new().with(step("read_ticket"));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("read_ticket"));
        assert_eq!(registry.get("read_ticket").unwrap().name(), "read_ticket");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_registry_get_required() {
        let registry = StepRegistry::new();
        let err = registry.get_required("missing").err().unwrap();
        assert!(matches!(err, CoreError::StepNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = StepRegistry::new()
            .with(step("eval_flows"))
            .with(step("aggregate_platforms"));

        assert_eq!(registry.names(), vec!["aggregate_platforms", "eval_flows"]);
    }
}
