//! Dotted-path attribute resolution over the six context maps.
//!
//! Resolution distinguishes two very different outcomes:
//!
//! - a **soft miss** (`Ok(None)`): some key along the path simply is not
//!   there. Operators then evaluate against an absent value — most pass
//!   `false`, the null checks pass `true`.
//! - a **hard error**: a key *is* there but the path tries to descend into
//!   a value that is not an object. That means the rule addresses data of a
//!   shape the request does not have, which is a processing error, not a
//!   denial.

use aegle_core::Value;

use crate::context::EvaluationContext;
use crate::error::PolicyError;
use crate::path::AttributePath;

/// Resolve an attribute path against the evaluation context.
///
/// The collection suffix, if any, is not interpreted here; the leaf
/// evaluator applies it to the resolved value.
///
/// # Errors
///
/// Returns [`PolicyError::Traversal`] when a nested segment is reached
/// through a non-object value.
pub fn resolve(
    path: &AttributePath,
    context: &EvaluationContext,
) -> Result<Option<Value>, PolicyError> {
    let map = context.map_for(path.context);

    let Some((first, rest)) = path.segments.split_first() else {
        return Ok(None);
    };
    let Some(mut current) = map.get(first).cloned() else {
        return Ok(None);
    };

    for segment in rest {
        let fields = match current {
            Value::Object(fields) => fields,
            other => {
                return Err(PolicyError::Traversal {
                    path: path.to_string(),
                    segment: segment.clone(),
                    found: other.type_name(),
                });
            }
        };
        match fields.get(segment) {
            Some(next) => current = next.clone(),
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

// =============================================================================
// Tests
// =============================================================================
