//! # aegle-policy
//!
//! Attribute-based access control (ABAC) decision engine.
//!
//! Given a [`PolicyRule`] and the six request-scoped attribute bags of an
//! [`EvaluationContext`], the engine decides whether the rule permits or
//! denies the action, and produces a human-auditable explanation when it
//! does not. Evaluation is a pure function of its inputs: no I/O, no shared
//! state, no retained references.
//!
//! ## Modules
//!
//! - [`rule`] - the policy rule model (effect, condition tree, operators)
//! - [`path`] - the context-prefixed attribute path grammar
//! - [`context`] - the request-scoped attribute bags and their builder
//! - [`resolver`] - dotted-path resolution with soft-miss semantics
//! - [`leaf`] - single-predicate evaluation
//! - [`evaluator`] - short-circuiting AND/OR tree evaluation
//! - [`trace`] - structured failure traces and explanation rendering
//! - [`engine`] - the decision engine applying the rule's effect
//!
//! ## Example
//!
//! ```ignore
//! use aegle_policy::prelude::*;
//!
//! let rule: PolicyRule = serde_json::from_slice(&stored_rule)?;
//! let context = EvaluationContext::builder()
//!     .subject_attr("id", user_id)
//!     .subject_attr("role", "manager")
//!     .path_attr("branch_id", branch_id)
//!     .build();
//!
//! match can_access(&rule, &context) {
//!     Ok(decision) if decision.is_allowed() => { /* 200 */ }
//!     Ok(decision) => { /* 403, log decision.deny_reason() */ }
//!     Err(_) => { /* processing error: fail closed, 403 */ }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod leaf;
pub mod path;
pub mod resolver;
pub mod rule;
pub mod trace;

pub use context::{EvaluationContext, EvaluationContextBuilder, attributes_from_json};
pub use engine::{
    AccessDecision, DEFAULT_MAX_DEPTH, DenyReason, EngineConfig, EvaluationReport, PolicyEngine,
    can_access,
};
pub use error::PolicyError;
pub use path::{AttributePath, CollectionBinding, ContextKind, PathError};
pub use rule::{
    ConditionLeaf, ConditionNode, Effect, LogicType, Operator, PolicyRule, ValidationError,
};
pub use trace::{LeafRecord, TraceEntry, render};

/// Type alias for policy evaluation results.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use aegle_policy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::PolicyResult;
    pub use crate::context::{EvaluationContext, attributes_from_json};
    pub use crate::engine::{
        AccessDecision, DenyReason, EngineConfig, EvaluationReport, PolicyEngine, can_access,
    };
    pub use crate::error::PolicyError;
    pub use crate::path::{AttributePath, ContextKind};
    pub use crate::rule::{
        ConditionLeaf, ConditionNode, Effect, LogicType, Operator, PolicyRule,
    };
    pub use aegle_core::Value;
}
