//! Static checks run before a pipeline executes.
//!
//! Parallel branches share no locks, so two branches may not write the same
//! key, and no branch may read a key another branch writes.

use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult};
use crate::pipeline::{Node, Pipeline};
use crate::registry::StepRegistry;
use crate::step::StepKeys;

/// Collect every problem found in the pipeline.
pub fn find_issues(pipeline: &Pipeline, registry: &StepRegistry) -> Vec<String> {
    let mut issues = Vec::new();
    check_node(&pipeline.root, registry, &mut issues);
    issues
}

/// Fail with `CoreError::Validation` if the pipeline has any problem.
pub fn validate(pipeline: &Pipeline, registry: &StepRegistry) -> CoreResult<()> {
    let issues = find_issues(pipeline, registry);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(issues))
    }
}

fn check_node(node: &Node, registry: &StepRegistry, issues: &mut Vec<String>) {
    match node {
        Node::Step { name } => {
            if !registry.contains(name) {
                issues.push(format!("step '{}' is not registered", name));
            }
        }
        Node::Sequential { children, .. } => {
            for child in children {
                check_node(child, registry, issues);
            }
        }
        Node::Parallel { name, children } => {
            for child in children {
                check_node(child, registry, issues);
            }
            check_branches(name, children, registry, issues);
        }
        Node::Loop {
            name,
            body,
            max_iterations,
            ..
        } => {
            if *max_iterations == Some(0) {
                issues.push(format!("loop '{}' can never run (max_iterations = 0)", name));
            }
            check_node(body, registry, issues);
        }
    }
}

fn check_branches(group: &str, children: &[Node], registry: &StepRegistry, issues: &mut Vec<String>) {
    // Unknown steps are already reported; skip branches we cannot resolve.
    let branches: Vec<(&str, StepKeys)> = children
        .iter()
        .filter_map(|c| c.keys(registry).ok().map(|k| (c.name(), k)))
        .collect();

    for (i, (left_name, left)) in branches.iter().enumerate() {
        for (right_name, right) in &branches[i + 1..] {
            for key in intersect(&left.writes, &right.writes) {
                issues.push(format!(
                    "parallel '{}': branches '{}' and '{}' both write '{}'",
                    group, left_name, right_name, key
                ));
            }
            for key in intersect(&left.reads, &right.writes) {
                issues.push(format!(
                    "parallel '{}': '{}' reads '{}' which '{}' writes",
                    group, left_name, key, right_name
                ));
            }
            for key in intersect(&right.reads, &left.writes) {
                issues.push(format!(
                    "parallel '{}': '{}' reads '{}' which '{}' writes",
                    group, right_name, key, left_name
                ));
            }
        }
    }
}

fn intersect<'a>(a: &'a BTreeSet<String>, b: &'a BTreeSet<String>) -> impl Iterator<Item = &'a String> {
    a.intersection(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PipelineContext;
    use crate::step::{Step, StepResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct KeyedStep {
        name: &'static str,
        keys: StepKeys,
    }

    #[async_trait]
    impl Step for KeyedStep {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Step with declared keys"
        }

        fn keys(&self) -> StepKeys {
            self.keys.clone()
        }

        async fn execute(&self, _context: &mut PipelineContext) -> CoreResult<StepResult> {
            Ok(StepResult::success(self.name))
        }
    }

    fn registry(steps: Vec<(&'static str, StepKeys)>) -> StepRegistry {
        let mut registry = StepRegistry::new();
        for (name, keys) in steps {
            registry.register(Arc::new(KeyedStep { name, keys }));
        }
        registry
    }

    #[test]
    fn test_disjoint_branches_pass() {
        let registry = registry(vec![
            ("a", StepKeys::new().reads("epic").writes("x")),
            ("b", StepKeys::new().reads("epic").writes("y")),
        ]);
        let pipeline = Pipeline::new("p", Node::parallel("par", [Node::step("a"), Node::step("b")]));

        assert!(validate(&pipeline, &registry).is_ok());
    }

    #[test]
    fn test_write_write_collision() {
        let registry = registry(vec![
            ("a", StepKeys::new().writes("x")),
            ("b", StepKeys::new().writes("x")),
        ]);
        let pipeline = Pipeline::new("p", Node::parallel("par", [Node::step("a"), Node::step("b")]));

        let issues = find_issues(&pipeline, &registry);
        assert_eq!(issues, vec!["parallel 'par': branches 'a' and 'b' both write 'x'"]);
    }

    #[test]
    fn test_read_write_collision_in_nested_branch() {
        let registry = registry(vec![
            ("a", StepKeys::new().writes("meta")),
            ("b1", StepKeys::new().writes("sdd")),
            ("b2", StepKeys::new().reads("sdd").reads("meta")),
        ]);
        let pipeline = Pipeline::new(
            "p",
            Node::parallel(
                "par",
                [
                    Node::step("a"),
                    Node::sequential("seq", [Node::step("b1"), Node::step("b2")]),
                ],
            ),
        );

        let issues = find_issues(&pipeline, &registry);
        assert_eq!(issues, vec!["parallel 'par': 'seq' reads 'meta' which 'a' writes"]);
    }

    #[test]
    fn test_unknown_step_and_zero_loop() {
        let registry = registry(vec![]);
        let pipeline = Pipeline::new(
            "p",
            Node::loop_over("l", Node::step("ghost"), "items", "current").with_max_iterations(0),
        );

        let err = validate(&pipeline, &registry).unwrap_err();
        match err {
            CoreError::Validation(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
