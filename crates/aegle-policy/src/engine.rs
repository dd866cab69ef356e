//! Decision engine: applies a rule's effect to its evaluated condition tree.
//!
//! This is the entry point hosts call once per request. Evaluation is
//! synchronous and side-effect-free: the engine reads the rule and the
//! context maps, never mutates or retains them, and may be shared freely
//! across request-handling threads.
//!
//! # Example
//!
//! ```ignore
//! use aegle_policy::engine::{PolicyEngine, EngineConfig};
//!
//! let engine = PolicyEngine::new(EngineConfig::default());
//! match engine.evaluate(&rule, &context) {
//!     Ok(decision) if decision.is_allowed() => { /* proceed */ }
//!     Ok(decision) => { /* 403 with decision.deny_reason() */ }
//!     Err(_) => { /* processing error: fail closed */ }
//! }
//! ```

use std::time::Instant;

use serde::Serialize;

use crate::PolicyResult;
use crate::context::EvaluationContext;
use crate::evaluator::evaluate_node;
use crate::rule::{Effect, PolicyRule};
use crate::trace::{TraceEntry, render};

/// Default bound on condition-tree depth.
///
/// Trees are tenant-authored, so the bound exists to turn a pathological
/// tree into a "policy too complex" error instead of stack exhaustion.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// =============================================================================
// Access Decision
// =============================================================================

/// Result of evaluating a rule cleanly.
///
/// Processing failures never appear here; they surface as the `Err` arm of
/// [`PolicyResult`] and callers must treat them as denials (fail closed).
#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// Access is granted.
    Allow,
    /// Access is denied with a reason.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if access was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Get the deny reason if access was denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            Self::Allow => None,
        }
    }
}

// =============================================================================
// Deny Reason
// =============================================================================

/// Reason for access denial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyReason {
    /// Error code for programmatic handling.
    pub code: String,

    /// Human-readable explanation, including the rendered failure trace
    /// when one exists. Audit text only; it carries no control-flow
    /// meaning.
    pub message: String,

    /// ID of the rule that denied access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl DenyReason {
    /// An Allow-effect rule whose conditions did not hold.
    #[must_use]
    pub fn conditions_not_met(rule: &PolicyRule, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| "conditions not met".to_string());
        Self {
            code: "conditions-not-met".to_string(),
            message: format!("Policy '{}' denied access: {detail}", rule.label()),
            rule_id: rule.id.clone(),
        }
    }

    /// A Deny-effect rule whose conditions matched.
    #[must_use]
    pub fn deny_rule_enforced(rule: &PolicyRule) -> Self {
        Self {
            code: "deny-rule-enforced".to_string(),
            message: format!("Policy '{}' matched and denies access", rule.label()),
            rule_id: rule.id.clone(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Configuration for the policy engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum condition-tree depth before evaluation is rejected.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// =============================================================================
// Evaluation Report
// =============================================================================

/// A decision together with its audit detail.
#[derive(Debug)]
pub struct EvaluationReport {
    /// The final access decision.
    pub decision: AccessDecision,

    /// Failure entries for the failing portion of the condition tree;
    /// empty when the tree passed.
    pub trace: Vec<TraceEntry>,

    /// Time taken to evaluate the rule (milliseconds).
    pub evaluation_time_ms: f64,
}

// =============================================================================
// Policy Engine
// =============================================================================

/// The policy decision engine.
///
/// Stateless apart from its configuration; a single instance can serve
/// every request.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: EngineConfig,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PolicyEngine {
    /// Create a new engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Decide whether `rule` permits the request described by `context`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed rules and for attribute or operand
    /// type mismatches. Callers must treat any error as a denial.
    pub fn evaluate(
        &self,
        rule: &PolicyRule,
        context: &EvaluationContext,
    ) -> PolicyResult<AccessDecision> {
        Ok(self.evaluate_with_report(rule, context)?.decision)
    }

    /// Like [`PolicyEngine::evaluate`], returning the structured failure
    /// trace and timing alongside the decision.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PolicyEngine::evaluate`].
    pub fn evaluate_with_report(
        &self,
        rule: &PolicyRule,
        context: &EvaluationContext,
    ) -> PolicyResult<EvaluationReport> {
        let start = Instant::now();

        rule.validate_within(self.config.max_depth)?;

        let mut trace = Vec::new();
        let matched = evaluate_node(&rule.condition, context, 0, self.config.max_depth, &mut trace)?;

        let decision = match rule.effect {
            Effect::Allow if matched => AccessDecision::Allow,
            Effect::Allow => {
                let detail = (!trace.is_empty()).then(|| render(&trace));
                AccessDecision::Deny(DenyReason::conditions_not_met(rule, detail))
            }
            Effect::Deny if matched => AccessDecision::Deny(DenyReason::deny_rule_enforced(rule)),
            Effect::Deny => AccessDecision::Allow,
        };

        match &decision {
            AccessDecision::Allow => {
                tracing::debug!(rule = %rule.label(), "Policy allowed access");
            }
            AccessDecision::Deny(reason) => {
                tracing::debug!(
                    rule = %rule.label(),
                    code = %reason.code,
                    "Policy denied access"
                );
            }
        }

        Ok(EvaluationReport {
            decision,
            trace,
            evaluation_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Evaluate a rule with the default engine configuration.
///
/// # Errors
///
/// Same failure modes as [`PolicyEngine::evaluate`].
pub fn can_access(
    rule: &PolicyRule,
    context: &EvaluationContext,
) -> PolicyResult<AccessDecision> {
    PolicyEngine::default().evaluate(rule, context)
}

// =============================================================================
// Tests
// =============================================================================
