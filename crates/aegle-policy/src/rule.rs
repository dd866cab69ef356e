//! Policy rule model.
//!
//! A [`PolicyRule`] names an effect and a condition tree. The tree is a true
//! tagged union: a node is either a single [`ConditionLeaf`] predicate or an
//! AND/OR composite over child nodes, so the wire-level invalid states
//! ("both leaf and children", "neither") cannot be constructed. Rules
//! deserialize from the JSON a policy store produces; attribute paths are
//! parsed during deserialization (see [`crate::path`]).
//!
//! # Example
//!
//! ```ignore
//! use aegle_policy::rule::PolicyRule;
//!
//! let rule: PolicyRule = serde_json::from_str(r#"{
//!     "name": "own-branch-only",
//!     "effect": "allow",
//!     "condition": {
//!         "logicType": "AND",
//!         "conditions": [
//!             {"attribute": "path.branch_id", "operator": "Equals",
//!              "resourceAttribute": "resource.branch_id"},
//!             {"attribute": "subject.role", "operator": "Equals", "value": "manager"}
//!         ]
//!     }
//! }"#)?;
//! rule.validate()?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::AttributePath;

// =============================================================================
// Policy Rule
// =============================================================================

/// A named access rule: an effect applied to a condition tree.
///
/// Rules are immutable during evaluation and are supplied per request by an
/// external store; the engine holds no rule state across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable rule name.
    pub name: String,

    /// Whether a matching condition tree grants or blocks access.
    pub effect: Effect,

    /// Root of the condition tree.
    pub condition: ConditionNode,

    /// Detailed description of the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PolicyRule {
    /// The identifier used in decision reasons: the store id when present,
    /// the name otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Validate the rule structure against the default depth limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is structurally malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_within(crate::engine::DEFAULT_MAX_DEPTH)
    }

    /// Validate the rule structure, rejecting trees deeper than `max_depth`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is structurally malformed or too deep.
    pub fn validate_within(&self, max_depth: usize) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        validate_node(&self.condition, 0, max_depth)
    }
}

// =============================================================================
// Effect
// =============================================================================

/// Whether a matching rule grants (Allow) or actively blocks (Deny) access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grant access when the condition tree matches.
    Allow,
    /// Block access when the condition tree matches.
    Deny,
}

// =============================================================================
// Condition Tree
// =============================================================================

/// Logical combinator for composite nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicType {
    /// All children must pass.
    #[serde(rename = "AND")]
    And,
    /// At least one child must pass.
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for LogicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// A node in the condition tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    /// An AND/OR combination of child nodes.
    #[serde(rename_all = "camelCase")]
    Composite {
        /// How the children combine.
        logic_type: LogicType,
        /// The ordered children; must be non-empty.
        conditions: Vec<ConditionNode>,
        /// Diagnostic label, surfaced in denial explanations.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A single predicate.
    Leaf(ConditionLeaf),
}

impl ConditionNode {
    /// Convenience constructor for an AND composite.
    #[must_use]
    pub fn all_of(conditions: Vec<ConditionNode>) -> Self {
        Self::Composite {
            logic_type: LogicType::And,
            conditions,
            description: None,
        }
    }

    /// Convenience constructor for an OR composite.
    #[must_use]
    pub fn any_of(conditions: Vec<ConditionNode>) -> Self {
        Self::Composite {
            logic_type: LogicType::Or,
            conditions,
            description: None,
        }
    }
}

impl From<ConditionLeaf> for ConditionNode {
    fn from(leaf: ConditionLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

// =============================================================================
// Condition Leaf
// =============================================================================

/// A single comparison predicate.
///
/// The left-hand side is always `attribute`. The right-hand side is exactly
/// one of `value` (a static JSON literal) or `resource_attribute` (another
/// path, resolved from the same request context) — except for the null
/// checks, which take neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionLeaf {
    /// Left-hand attribute path.
    pub attribute: AttributePath,

    /// Comparison operator.
    pub operator: Operator,

    /// Static comparison target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Attribute path compared against `attribute` instead of a static
    /// value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_attribute: Option<AttributePath>,
}

// =============================================================================
// Operator
// =============================================================================

/// Comparison operator for leaf conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Encoding-tolerant equality.
    Equals,
    /// Negated equality.
    NotEquals,
    /// The attribute is absent or null.
    IsNull,
    /// The attribute is present and non-null.
    IsNotNull,
    /// Numeric strictly-greater comparison.
    GreaterThan,
    /// Numeric greater-or-equal comparison.
    GreaterThanOrEqual,
    /// Numeric strictly-less comparison.
    LessThan,
    /// Numeric less-or-equal comparison.
    LessThanOrEqual,
    /// String prefix test.
    StartsWith,
    /// String suffix test.
    EndsWith,
    /// Substring test.
    Includes,
    /// Temporal strictly-before comparison.
    Before,
    /// Temporal strictly-after comparison.
    After,
    /// List membership, optionally on an extracted element field.
    Contains,
}

impl Operator {
    /// The operator's wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::IsNull => "IsNull",
            Self::IsNotNull => "IsNotNull",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::Includes => "Includes",
            Self::Before => "Before",
            Self::After => "After",
            Self::Contains => "Contains",
        }
    }

    /// Returns `true` for `IsNull`/`IsNotNull`, which take no comparison
    /// target.
    #[must_use]
    pub fn is_null_check(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_node(node: &ConditionNode, depth: usize, max_depth: usize) -> Result<(), ValidationError> {
    if depth >= max_depth {
        return Err(ValidationError::TooDeep { max_depth });
    }
    match node {
        ConditionNode::Composite { conditions, .. } => {
            if conditions.is_empty() {
                return Err(ValidationError::EmptyComposite);
            }
            for child in conditions {
                validate_node(child, depth + 1, max_depth)?;
            }
            Ok(())
        }
        ConditionNode::Leaf(leaf) => validate_leaf(leaf),
    }
}

fn validate_leaf(leaf: &ConditionLeaf) -> Result<(), ValidationError> {
    let has_value = leaf.value.is_some();
    let has_attribute = leaf.resource_attribute.is_some();

    if leaf.operator.is_null_check() {
        if has_value || has_attribute {
            return Err(ValidationError::UnexpectedComparison {
                operator: leaf.operator,
                attribute: leaf.attribute.to_string(),
            });
        }
    } else {
        match (has_value, has_attribute) {
            (false, false) => {
                return Err(ValidationError::MissingComparison {
                    operator: leaf.operator,
                    attribute: leaf.attribute.to_string(),
                });
            }
            (true, true) => {
                return Err(ValidationError::ConflictingComparison {
                    operator: leaf.operator,
                    attribute: leaf.attribute.to_string(),
                });
            }
            _ => {}
        }
    }

    if leaf.attribute.is_collection() && leaf.operator != Operator::Contains {
        return Err(ValidationError::CollectionOutsideContains {
            attribute: leaf.attribute.to_string(),
        });
    }
    if let Some(ref target) = leaf.resource_attribute
        && target.is_collection()
    {
        return Err(ValidationError::CollectionOutsideContains {
            attribute: target.to_string(),
        });
    }

    Ok(())
}

/// Errors from structural rule validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A composite node has no children.
    #[error("Composite condition must have at least one child")]
    EmptyComposite,

    /// The condition tree is deeper than the allowed limit.
    #[error("Condition tree exceeds maximum depth {max_depth}")]
    TooDeep {
        /// The configured depth limit.
        max_depth: usize,
    },

    /// A comparison operator has no target.
    #[error("{operator} condition on '{attribute}' requires a value or a resource attribute")]
    MissingComparison {
        /// The operator.
        operator: Operator,
        /// The leaf's attribute path.
        attribute: String,
    },

    /// A leaf carries both a static value and a resource attribute.
    #[error("{operator} condition on '{attribute}' cannot carry both a value and a resource attribute")]
    ConflictingComparison {
        /// The operator.
        operator: Operator,
        /// The leaf's attribute path.
        attribute: String,
    },

    /// A null check carries a comparison target.
    #[error("{operator} condition on '{attribute}' does not take a comparison target")]
    UnexpectedComparison {
        /// The operator.
        operator: Operator,
        /// The leaf's attribute path.
        attribute: String,
    },

    /// A `[*]` collection suffix appears outside a Contains attribute.
    #[error("Collection syntax on '{attribute}' is only valid with the Contains operator")]
    CollectionOutsideContains {
        /// The offending path.
        attribute: String,
    },
}

// =============================================================================
// Tests
// =============================================================================
