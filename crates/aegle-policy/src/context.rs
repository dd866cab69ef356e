//! Request-scoped attribute bags for policy evaluation.
//!
//! The caller builds one [`EvaluationContext`] per request from whatever it
//! already knows: the authenticated principal, the stored resource, and the
//! parsed pieces of the HTTP request. The engine only reads the maps; it
//! never mutates or retains them.
//!
//! # Usage
//!
//! ```ignore
//! use aegle_policy::context::EvaluationContext;
//!
//! let context = EvaluationContext::builder()
//!     .subject_attr("id", subject_id)
//!     .subject_attr("role", "manager")
//!     .with_resource(resource_attributes)
//!     .path_attr("branch_id", branch_id)
//!     .build();
//! ```

use std::collections::HashMap;

use aegle_core::Value;

use crate::path::ContextKind;

// =============================================================================
// Evaluation Context
// =============================================================================

/// The six attribute bags a rule can address.
///
/// All maps default to empty; an empty map is legal and every lookup into it
/// is a soft miss. Header keys should be canonicalized by the caller.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// Authenticated principal attributes.
    pub subject: HashMap<String, Value>,
    /// Attributes of the entity being acted on.
    pub resource: HashMap<String, Value>,
    /// Path parameters.
    pub path: HashMap<String, Value>,
    /// Parsed request payload.
    pub body: HashMap<String, Value>,
    /// Query-string parameters.
    pub query: HashMap<String, Value>,
    /// Request headers.
    pub header: HashMap<String, Value>,
}

impl EvaluationContext {
    /// Start building a context.
    #[must_use]
    pub fn builder() -> EvaluationContextBuilder {
        EvaluationContextBuilder::default()
    }

    /// The map addressed by a context kind.
    #[must_use]
    pub fn map_for(&self, kind: ContextKind) -> &HashMap<String, Value> {
        match kind {
            ContextKind::Subject => &self.subject,
            ContextKind::Resource => &self.resource,
            ContextKind::Path => &self.path,
            ContextKind::Body => &self.body,
            ContextKind::Query => &self.query,
            ContextKind::Header => &self.header,
        }
    }
}

/// Convert a JSON object into an attribute bag.
///
/// This is the usual way to fill the `body` and `resource` maps from data
/// that is already JSON. Non-object values yield an empty bag.
#[must_use]
pub fn attributes_from_json(json: serde_json::Value) -> HashMap<String, Value> {
    match json {
        serde_json::Value::Object(fields) => fields
            .into_iter()
            .map(|(key, value)| (key, Value::from_json(value)))
            .collect(),
        _ => HashMap::new(),
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`EvaluationContext`].
///
/// Whole maps can be supplied with the `with_*` methods; the `*_attr`
/// methods insert single attributes.
#[derive(Debug, Default)]
pub struct EvaluationContextBuilder {
    context: EvaluationContext,
}

impl EvaluationContextBuilder {
    /// Create a new builder with all bags empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the subject bag.
    #[must_use]
    pub fn with_subject(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.subject = attributes;
        self
    }

    /// Replace the resource bag.
    #[must_use]
    pub fn with_resource(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.resource = attributes;
        self
    }

    /// Replace the path-parameter bag.
    #[must_use]
    pub fn with_path(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.path = attributes;
        self
    }

    /// Replace the body bag.
    #[must_use]
    pub fn with_body(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.body = attributes;
        self
    }

    /// Replace the query-parameter bag.
    #[must_use]
    pub fn with_query(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.query = attributes;
        self
    }

    /// Replace the header bag.
    #[must_use]
    pub fn with_header(mut self, attributes: HashMap<String, Value>) -> Self {
        self.context.header = attributes;
        self
    }

    /// Insert a single subject attribute.
    #[must_use]
    pub fn subject_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.subject.insert(key.into(), value.into());
        self
    }

    /// Insert a single resource attribute.
    #[must_use]
    pub fn resource_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.resource.insert(key.into(), value.into());
        self
    }

    /// Insert a single path parameter.
    #[must_use]
    pub fn path_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.path.insert(key.into(), value.into());
        self
    }

    /// Insert a single body attribute.
    #[must_use]
    pub fn body_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.body.insert(key.into(), value.into());
        self
    }

    /// Insert a single query parameter.
    #[must_use]
    pub fn query_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.query.insert(key.into(), value.into());
        self
    }

    /// Insert a single header.
    #[must_use]
    pub fn header_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.header.insert(key.into(), value.into());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> EvaluationContext {
        self.context
    }
}

// =============================================================================
// Tests
// =============================================================================
