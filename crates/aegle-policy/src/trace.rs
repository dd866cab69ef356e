//! Structured evaluation trace and explanation rendering.
//!
//! Evaluation and explanation are deliberately separate concerns: the tree
//! evaluator records *what happened* — which predicates ran, what their
//! operands resolved to, which composite exhausted its alternatives — and
//! [`render`] turns that record into the indented text an auditor reads.
//! The text carries no control-flow meaning; callers who want structure use
//! the entries directly.

use aegle_core::Value;
use serde::Serialize;

use crate::rule::{LogicType, Operator};

// =============================================================================
// Trace Entries
// =============================================================================

/// What a single leaf evaluation saw.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafRecord {
    /// The leaf's attribute path, in grammar form.
    pub attribute: String,

    /// The operator that ran.
    pub operator: Operator,

    /// The resolved left-hand value; `None` on a soft miss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Value>,

    /// The comparison target; `None` for null checks and soft-missed
    /// resource attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Value>,

    /// Whether the predicate passed.
    pub passed: bool,
}

/// One entry in the failure trace.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TraceEntry {
    /// A leaf predicate that was evaluated.
    Leaf {
        /// Nesting depth, used for indentation.
        depth: usize,
        /// The evaluation record.
        record: LeafRecord,
    },
    /// A composite whose alternatives were all exhausted.
    Branch {
        /// Nesting depth, used for indentation.
        depth: usize,
        /// The combinator that failed.
        logic: LogicType,
        /// Number of alternatives that were tried.
        children: usize,
        /// The node's diagnostic label, if the author set one.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a failure trace as indented, human-readable lines.
///
/// Returns an empty string for an empty trace.
#[must_use]
pub fn render(entries: &[TraceEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        if !out.is_empty() {
            out.push('\n');
        }
        match entry {
            TraceEntry::Leaf { depth, record } => {
                out.push_str(&indent(*depth));
                out.push_str(&render_leaf(record));
            }
            TraceEntry::Branch {
                depth,
                logic,
                children,
                description,
            } => {
                out.push_str(&indent(*depth));
                match logic {
                    LogicType::Or => {
                        out.push_str(&format!("none of {children} alternatives matched"));
                    }
                    LogicType::And => {
                        out.push_str(&format!("not all of {children} conditions held"));
                    }
                }
                if let Some(label) = description {
                    out.push_str(&format!(" ({label})"));
                }
                out.push(':');
            }
        }
    }
    out
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn render_leaf(record: &LeafRecord) -> String {
    let verdict = if record.passed { "passed" } else { "failed" };
    let resolved = render_operand(record.left.as_ref());

    if record.operator.is_null_check() {
        format!(
            "{} {} {verdict} (resolved: {resolved})",
            record.attribute, record.operator
        )
    } else {
        let target = render_operand(record.right.as_ref());
        format!(
            "{} {} {target} {verdict} (resolved: {resolved})",
            record.attribute, record.operator
        )
    }
}

fn render_operand(value: Option<&Value>) -> String {
    value.map_or_else(|| "<absent>".to_string(), ToString::to_string)
}

// =============================================================================
// Tests
// =============================================================================
