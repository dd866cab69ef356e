//! Single-predicate evaluation.
//!
//! A leaf compares one resolved attribute against either a static JSON
//! literal or a second resolved attribute. The right-hand side is resolved
//! first, then the left, then the operator dispatches into the comparator
//! library. Soft-missed operands enter the comparison as absent values:
//! equality treats them as null, the typed comparisons reject them with the
//! error naming the offending side.

use aegle_core::compare::{StringOp, TimeOp, compare_numbers, compare_strings, compare_times, robust_eq};
use aegle_core::{CompareError, Value};
use std::cmp::Ordering;

use crate::context::EvaluationContext;
use crate::error::PolicyError;
use crate::resolver::resolve;
use crate::rule::{ConditionLeaf, Operator};
use crate::trace::LeafRecord;

static NULL_VALUE: Value = Value::Null;

/// The result of evaluating one leaf.
#[derive(Debug)]
pub struct LeafOutcome {
    /// Whether the predicate passed.
    pub passed: bool,
    /// Structured record of what the predicate saw, for the failure trace.
    pub record: LeafRecord,
}

/// Evaluate a single predicate against the request context.
///
/// # Errors
///
/// Returns an error for attribute-shape mismatches, operands outside a
/// typed operator's domain, or a leaf with no comparison target. A soft
/// miss is never an error.
pub fn evaluate_leaf(
    leaf: &ConditionLeaf,
    context: &EvaluationContext,
) -> Result<LeafOutcome, PolicyError> {
    let target = resolve_target(leaf, context)?;
    let left = resolve(&leaf.attribute, context)?;

    let passed = match leaf.operator {
        Operator::Equals => robust_eq(operand(left.as_ref()), operand(target.as_ref())),
        Operator::NotEquals => !robust_eq(operand(left.as_ref()), operand(target.as_ref())),
        Operator::IsNull => left.as_ref().is_none_or(Value::is_null),
        Operator::IsNotNull => left.as_ref().is_some_and(|value| !value.is_null()),
        Operator::GreaterThan => ordering(leaf, left.as_ref(), target.as_ref())?.is_gt(),
        Operator::GreaterThanOrEqual => ordering(leaf, left.as_ref(), target.as_ref())?.is_ge(),
        Operator::LessThan => ordering(leaf, left.as_ref(), target.as_ref())?.is_lt(),
        Operator::LessThanOrEqual => ordering(leaf, left.as_ref(), target.as_ref())?.is_le(),
        Operator::StartsWith => strings(leaf, StringOp::StartsWith, left.as_ref(), target.as_ref())?,
        Operator::EndsWith => strings(leaf, StringOp::EndsWith, left.as_ref(), target.as_ref())?,
        Operator::Includes => strings(leaf, StringOp::Includes, left.as_ref(), target.as_ref())?,
        Operator::Before => times(leaf, TimeOp::Before, left.as_ref(), target.as_ref())?,
        Operator::After => times(leaf, TimeOp::After, left.as_ref(), target.as_ref())?,
        Operator::Contains => evaluate_contains(leaf, left.as_ref(), target.as_ref())?,
    };

    Ok(LeafOutcome {
        passed,
        record: LeafRecord {
            attribute: leaf.attribute.to_string(),
            operator: leaf.operator,
            left,
            right: target,
            passed,
        },
    })
}

/// Resolve the comparison target: a second attribute path when set, else
/// the static JSON literal, else nothing for the null checks.
fn resolve_target(
    leaf: &ConditionLeaf,
    context: &EvaluationContext,
) -> Result<Option<Value>, PolicyError> {
    if let Some(ref target_path) = leaf.resource_attribute {
        return resolve(target_path, context);
    }
    if let Some(ref literal) = leaf.value {
        return Ok(Some(Value::from_json(literal.clone())));
    }
    if leaf.operator.is_null_check() {
        return Ok(None);
    }
    Err(PolicyError::MissingOperand {
        operator: leaf.operator,
        attribute: leaf.attribute.to_string(),
    })
}

/// Membership test over a resolved list.
///
/// Without an extraction field, each element is compared against the target
/// directly. With `[*].field`, each element must be an object; the field is
/// extracted and compared. Elements that are not objects or lack the field
/// simply fail — only a non-list at the collection path is an error.
fn evaluate_contains(
    leaf: &ConditionLeaf,
    left: Option<&Value>,
    target: Option<&Value>,
) -> Result<bool, PolicyError> {
    let items = match left {
        // Soft-missed collection: nothing to be a member of.
        None => return Ok(false),
        Some(Value::List(items)) => items,
        Some(other) => {
            return Err(PolicyError::NotACollection {
                attribute: leaf.attribute.to_string(),
                found: other.type_name(),
            });
        }
    };

    let target = operand(target);
    let field = leaf
        .attribute
        .collection
        .as_ref()
        .and_then(|binding| binding.field.as_deref());

    let passed = match field {
        None => items.iter().any(|element| robust_eq(element, target)),
        Some(name) => items.iter().any(|element| {
            element
                .as_object()
                .and_then(|fields| fields.get(name))
                .is_some_and(|extracted| robust_eq(extracted, target))
        }),
    };
    Ok(passed)
}

fn operand(value: Option<&Value>) -> &Value {
    value.unwrap_or(&NULL_VALUE)
}

fn ordering(
    leaf: &ConditionLeaf,
    left: Option<&Value>,
    right: Option<&Value>,
) -> Result<Ordering, PolicyError> {
    compare_numbers(operand(left), operand(right)).map_err(|source| incomparable(leaf, source))
}

fn strings(
    leaf: &ConditionLeaf,
    op: StringOp,
    left: Option<&Value>,
    right: Option<&Value>,
) -> Result<bool, PolicyError> {
    compare_strings(op, operand(left), operand(right)).map_err(|source| incomparable(leaf, source))
}

fn times(
    leaf: &ConditionLeaf,
    op: TimeOp,
    left: Option<&Value>,
    right: Option<&Value>,
) -> Result<bool, PolicyError> {
    compare_times(op, operand(left), operand(right)).map_err(|source| incomparable(leaf, source))
}

fn incomparable(leaf: &ConditionLeaf, source: CompareError) -> PolicyError {
    PolicyError::Incomparable {
        operator: leaf.operator,
        attribute: leaf.attribute.to_string(),
        source,
    }
}

// =============================================================================
// Tests
// =============================================================================
