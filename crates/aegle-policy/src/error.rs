//! Policy evaluation error types.
//!
//! Everything here is a processing failure, never a decision: a rule that
//! evaluates cleanly to "not allowed" is reported through
//! [`AccessDecision::Deny`], and an absent attribute is a soft miss, not an
//! error. Callers must treat any [`PolicyError`] as a denial (fail closed).
//!
//! [`AccessDecision::Deny`]: crate::engine::AccessDecision::Deny

use aegle_core::compare::CompareError;

use crate::path::PathError;
use crate::rule::{Operator, ValidationError};

/// Errors that can occur while evaluating a policy rule.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// An attribute path does not follow the supported grammar.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The rule failed structural validation.
    #[error(transparent)]
    Rule(#[from] ValidationError),

    /// Nested lookup traversed into a value that is not an object.
    #[error("Cannot resolve '{path}': segment '{segment}' requires an object, found {found}")]
    Traversal {
        /// The full attribute path being resolved.
        path: String,
        /// The segment that could not be read.
        segment: String,
        /// Type name of the value that blocked traversal.
        found: &'static str,
    },

    /// A typed operator was applied to operands outside its domain.
    #[error("{operator} on '{attribute}': {source}")]
    Incomparable {
        /// The operator being evaluated.
        operator: Operator,
        /// The leaf's attribute path.
        attribute: String,
        /// The underlying comparison failure.
        #[source]
        source: CompareError,
    },

    /// A membership test resolved something other than a list.
    #[error("Contains on '{attribute}' requires a list, found {found}")]
    NotACollection {
        /// The collection attribute path.
        attribute: String,
        /// Type name of the resolved value.
        found: &'static str,
    },

    /// A leaf needs a comparison target but carries neither a static value
    /// nor a resource attribute.
    #[error("{operator} on '{attribute}' has no comparison target")]
    MissingOperand {
        /// The operator being evaluated.
        operator: Operator,
        /// The leaf's attribute path.
        attribute: String,
    },

    /// A composite node has no children.
    #[error("Composite condition has no children")]
    EmptyComposite,

    /// The condition tree exceeds the configured depth limit.
    #[error("Policy too complex: condition tree exceeds maximum depth {max_depth}")]
    TooDeep {
        /// The configured depth limit.
        max_depth: usize,
    },
}

impl PolicyError {
    /// Returns `true` if the error stems from the rule itself (grammar,
    /// shape, or depth) rather than from the request data it met.
    #[must_use]
    pub fn is_malformed_rule(&self) -> bool {
        matches!(
            self,
            Self::Path(_)
                | Self::Rule(_)
                | Self::MissingOperand { .. }
                | Self::EmptyComposite
                | Self::TooDeep { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegle_core::compare::Operand;

    #[test]
    fn test_error_display() {
        let err = PolicyError::Traversal {
            path: "subject.branch.id".to_string(),
            segment: "id".to_string(),
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "Cannot resolve 'subject.branch.id': segment 'id' requires an object, found string"
        );

        let err = PolicyError::TooDeep { max_depth: 64 };
        assert!(err.to_string().contains("maximum depth 64"));
    }

    #[test]
    fn test_incomparable_carries_the_side() {
        let err = PolicyError::Incomparable {
            operator: Operator::GreaterThan,
            attribute: "subject.age".to_string(),
            source: CompareError::NotNumeric {
                side: Operand::Left,
                value: "null".to_string(),
            },
        };
        let rendered = err.to_string();
        assert!(rendered.contains("GreaterThan"));
        assert!(rendered.contains("left operand"));
    }

    #[test]
    fn test_malformed_rule_predicate() {
        assert!(PolicyError::EmptyComposite.is_malformed_rule());
        assert!(PolicyError::TooDeep { max_depth: 64 }.is_malformed_rule());
        assert!(
            !PolicyError::Traversal {
                path: "body.x".to_string(),
                segment: "x".to_string(),
                found: "number",
            }
            .is_malformed_rule()
        );
    }
}
