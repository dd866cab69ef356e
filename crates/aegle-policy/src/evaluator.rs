//! Recursive condition-tree evaluation.
//!
//! Composites combine child results with short-circuiting: AND stops at the
//! first failing child and its failure becomes the reason; OR stops at the
//! first passing child and reports nothing, or records every alternative's
//! failure when all of them miss. Recursion is bounded by an explicit depth
//! limit — tenant-authored trees must not be able to exhaust the stack.

use crate::context::EvaluationContext;
use crate::error::PolicyError;
use crate::leaf::evaluate_leaf;
use crate::rule::{ConditionNode, LogicType};
use crate::trace::TraceEntry;

/// Evaluate a condition node, appending failure entries to `trace`.
///
/// `depth` starts at 0 for the root and is also the indentation level of
/// any trace entries the node emits.
///
/// # Errors
///
/// Returns an error for malformed nodes (no children, depth limit) and for
/// any leaf-level processing failure.
pub fn evaluate_node(
    node: &ConditionNode,
    context: &EvaluationContext,
    depth: usize,
    max_depth: usize,
    trace: &mut Vec<TraceEntry>,
) -> Result<bool, PolicyError> {
    if depth >= max_depth {
        return Err(PolicyError::TooDeep { max_depth });
    }

    match node {
        ConditionNode::Leaf(leaf) => {
            let outcome = evaluate_leaf(leaf, context)?;
            tracing::trace!(
                attribute = %outcome.record.attribute,
                operator = %outcome.record.operator,
                passed = outcome.passed,
                "Evaluated condition leaf"
            );
            if !outcome.passed {
                trace.push(TraceEntry::Leaf {
                    depth,
                    record: outcome.record,
                });
            }
            Ok(outcome.passed)
        }
        ConditionNode::Composite {
            logic_type,
            conditions,
            description,
        } => {
            if conditions.is_empty() {
                return Err(PolicyError::EmptyComposite);
            }
            match logic_type {
                LogicType::And => {
                    for child in conditions {
                        if !evaluate_node(child, context, depth + 1, max_depth, trace)? {
                            // Short-circuit: the failing child has already
                            // recorded its reason.
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                LogicType::Or => {
                    let mark = trace.len();
                    trace.push(TraceEntry::Branch {
                        depth,
                        logic: *logic_type,
                        children: conditions.len(),
                        description: description.clone(),
                    });
                    for child in conditions {
                        if evaluate_node(child, context, depth + 1, max_depth, trace)? {
                            // Short-circuit: drop the branch record and any
                            // failures from earlier alternatives.
                            trace.truncate(mark);
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{ConditionLeaf, Operator};
    use proptest::prelude::*;
    use serde_json::json;

    /// A leaf that passes iff `subject.<key>` is `true`.
    fn flag_leaf(key: &str) -> ConditionNode {
        ConditionLeaf {
            attribute: format!("subject.{key}").parse().unwrap(),
            operator: Operator::Equals,
            value: Some(json!(true)),
            resource_attribute: None,
        }
        .into()
    }

    /// A context with `subject.f{i}` set to the corresponding flag.
    fn flags_context(flags: &[bool]) -> EvaluationContext {
        let mut builder = EvaluationContext::builder();
        for (index, flag) in flags.iter().enumerate() {
            builder = builder.subject_attr(format!("f{index}"), *flag);
        }
        builder.build()
    }

    fn flag_children(count: usize) -> Vec<ConditionNode> {
        (0..count).map(|index| flag_leaf(&format!("f{index}"))).collect()
    }

    fn run(node: &ConditionNode, context: &EvaluationContext) -> (bool, Vec<TraceEntry>) {
        let mut trace = Vec::new();
        let passed = evaluate_node(node, context, 0, 64, &mut trace).unwrap();
        (passed, trace)
    }

    // -------------------------------------------------------------------------
    // AND Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_and_requires_every_child() {
        let node = ConditionNode::all_of(flag_children(3));

        let (passed, trace) = run(&node, &flags_context(&[true, true, true]));
        assert!(passed);
        assert!(trace.is_empty());

        let (passed, _) = run(&node, &flags_context(&[true, false, true]));
        assert!(!passed);
    }

    #[test]
    fn test_and_short_circuits_on_first_failure() {
        // Second child would error (ordering on a string), but the first
        // child already fails, so it is never evaluated.
        let breaking: ConditionNode = ConditionLeaf {
            attribute: "subject.name".parse().unwrap(),
            operator: Operator::GreaterThan,
            value: Some(json!(1)),
            resource_attribute: None,
        }
        .into();
        let node = ConditionNode::all_of(vec![flag_leaf("f0"), breaking]);

        let context = EvaluationContext::builder()
            .subject_attr("f0", false)
            .subject_attr("name", "lena")
            .build();
        let mut trace = Vec::new();
        let passed = evaluate_node(&node, &context, 0, 64, &mut trace).unwrap();
        assert!(!passed);
        assert_eq!(trace.len(), 1, "only the first failure is recorded");
    }

    // -------------------------------------------------------------------------
    // OR Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_or_passes_on_any_child() {
        let node = ConditionNode::any_of(flag_children(3));

        let (passed, trace) = run(&node, &flags_context(&[false, true, false]));
        assert!(passed);
        assert!(trace.is_empty(), "a passing OR leaves no failure trace");

        let (passed, trace) = run(&node, &flags_context(&[false, false, false]));
        assert!(!passed);
        // Branch record plus every failed alternative.
        assert_eq!(trace.len(), 4);
    }

    #[test]
    fn test_or_short_circuits_on_first_success() {
        // The second child would error; the first passes first.
        let breaking: ConditionNode = ConditionLeaf {
            attribute: "subject.name".parse().unwrap(),
            operator: Operator::GreaterThan,
            value: Some(json!(1)),
            resource_attribute: None,
        }
        .into();
        let node = ConditionNode::any_of(vec![flag_leaf("f0"), breaking]);

        let context = EvaluationContext::builder()
            .subject_attr("f0", true)
            .subject_attr("name", "lena")
            .build();
        let mut trace = Vec::new();
        assert!(evaluate_node(&node, &context, 0, 64, &mut trace).unwrap());
    }

    #[test]
    fn test_nested_or_inside_and_traces_alternatives() {
        let node = ConditionNode::all_of(vec![
            flag_leaf("f0"),
            ConditionNode::any_of(vec![flag_leaf("f1"), flag_leaf("f2")]),
        ]);

        let (passed, trace) = run(&node, &flags_context(&[true, false, false]));
        assert!(!passed);
        assert!(matches!(trace[0], TraceEntry::Branch { depth: 1, .. }));
        assert!(matches!(trace[1], TraceEntry::Leaf { depth: 2, .. }));
        assert!(matches!(trace[2], TraceEntry::Leaf { depth: 2, .. }));
    }

    // -------------------------------------------------------------------------
    // Malformed Node Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_composite_is_an_error() {
        let node = ConditionNode::all_of(vec![]);
        let mut trace = Vec::new();
        let err = evaluate_node(&node, &EvaluationContext::default(), 0, 64, &mut trace)
            .unwrap_err();
        assert!(matches!(err, PolicyError::EmptyComposite));
    }

    #[test]
    fn test_depth_limit_is_an_error_not_a_false() {
        let mut node = flag_leaf("f0");
        for _ in 0..100 {
            node = ConditionNode::all_of(vec![node]);
        }
        let mut trace = Vec::new();
        let err = evaluate_node(&node, &flags_context(&[true]), 0, 64, &mut trace).unwrap_err();
        assert!(matches!(err, PolicyError::TooDeep { max_depth: 64 }));
    }

    #[test]
    fn test_depth_limit_permits_trees_within_bound() {
        let mut node = flag_leaf("f0");
        for _ in 0..10 {
            node = ConditionNode::all_of(vec![node]);
        }
        let (passed, _) = run(&node, &flags_context(&[true]));
        assert!(passed);
    }

    // -------------------------------------------------------------------------
    // Truth Table Properties
    // -------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_and_matches_conjunction(flags in proptest::collection::vec(any::<bool>(), 1..8)) {
            let node = ConditionNode::all_of(flag_children(flags.len()));
            let (passed, _) = run(&node, &flags_context(&flags));
            prop_assert_eq!(passed, flags.iter().all(|flag| *flag));
        }

        #[test]
        fn prop_or_matches_disjunction(flags in proptest::collection::vec(any::<bool>(), 1..8)) {
            let node = ConditionNode::any_of(flag_children(flags.len()));
            let (passed, _) = run(&node, &flags_context(&flags));
            prop_assert_eq!(passed, flags.iter().any(|flag| *flag));
        }

        #[test]
        fn prop_nested_two_level_trees(
            outer_and in any::<bool>(),
            groups in proptest::collection::vec(
                (any::<bool>(), proptest::collection::vec(any::<bool>(), 1..4)),
                1..4
            )
        ) {
            // Build a two-level tree of AND/OR groups over flag leaves and
            // check it against the boolean evaluation of the same shape.
            let mut index = 0;
            let mut children = Vec::new();
            let mut all_flags = Vec::new();
            let mut expected_children = Vec::new();

            for (group_and, flags) in &groups {
                let leaves: Vec<ConditionNode> = flags
                    .iter()
                    .map(|flag| {
                        let leaf = flag_leaf(&format!("f{index}"));
                        all_flags.push(*flag);
                        index += 1;
                        leaf
                    })
                    .collect();
                expected_children.push(if *group_and {
                    flags.iter().all(|flag| *flag)
                } else {
                    flags.iter().any(|flag| *flag)
                });
                children.push(if *group_and {
                    ConditionNode::all_of(leaves)
                } else {
                    ConditionNode::any_of(leaves)
                });
            }

            let node = if outer_and {
                ConditionNode::all_of(children)
            } else {
                ConditionNode::any_of(children)
            };
            let expected = if outer_and {
                expected_children.iter().all(|result| *result)
            } else {
                expected_children.iter().any(|result| *result)
            };

            let (passed, _) = run(&node, &flags_context(&all_flags));
            prop_assert_eq!(passed, expected);
        }
    }
}
