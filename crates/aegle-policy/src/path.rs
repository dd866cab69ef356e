//! Attribute path grammar.
//!
//! Attributes address request data with a context-prefixed dotted path:
//! `<context>.<key>[.<nested-key>]*` where the context is one of `subject`,
//! `resource`, `path`, `body`, `query`, `header`. The Contains operator
//! extends the grammar with a collection suffix: `<path>[*]` tests
//! membership in a list, `<path>[*].<field>` tests membership on a field
//! extracted from each element.
//!
//! Paths are parsed into [`AttributePath`] once, when the rule is loaded,
//! so grammar errors surface at load time naming the offending path rather
//! than in the middle of a request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Context Kind
// =============================================================================

/// The six request-scoped attribute bags a path can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// Authenticated principal attributes.
    Subject,
    /// Attributes of the entity being acted on.
    Resource,
    /// Path parameters.
    Path,
    /// Parsed request payload.
    Body,
    /// Query-string parameters.
    Query,
    /// Request headers (keys canonicalized by the caller).
    Header,
}

impl ContextKind {
    /// All context kinds, in grammar order.
    pub const ALL: [Self; 6] = [
        Self::Subject,
        Self::Resource,
        Self::Path,
        Self::Body,
        Self::Query,
        Self::Header,
    ];

    /// The grammar prefix for this context.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Resource => "resource",
            Self::Path => "path",
            Self::Body => "body",
            Self::Query => "query",
            Self::Header => "header",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == prefix)
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Attribute Path
// =============================================================================

/// The Contains-operator collection suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionBinding {
    /// Field extracted from each element before comparison; `None` tests
    /// membership of the elements themselves.
    pub field: Option<String>,
}

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// Which context map the path addresses.
    pub context: ContextKind,
    /// Dot-separated key path inside that map; never empty.
    pub segments: Vec<String>,
    /// Collection suffix, only meaningful for the Contains operator.
    pub collection: Option<CollectionBinding>,
}

impl AttributePath {
    /// Returns `true` if the path carries a `[*]` collection suffix.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, PathError> {
        let (base, collection) = split_collection_suffix(raw)?;

        let Some((prefix, remainder)) = base.split_once('.') else {
            return Err(PathError::MissingContext { path: raw.to_string() });
        };
        let Some(context) = ContextKind::from_prefix(prefix) else {
            return Err(PathError::UnknownContext {
                path: raw.to_string(),
                context: prefix.to_string(),
            });
        };
        if remainder.is_empty() {
            return Err(PathError::EmptySegment { path: raw.to_string() });
        }

        let segments: Vec<String> = remainder.split('.').map(str::to_string).collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { path: raw.to_string() });
            }
            if segment.contains('[') || segment.contains(']') {
                return Err(PathError::InvalidCollectionSuffix { path: raw.to_string() });
            }
        }

        Ok(Self {
            context,
            segments,
            collection,
        })
    }
}

/// Split off a trailing `[*]` or `[*].field` suffix, if present.
fn split_collection_suffix(raw: &str) -> Result<(&str, Option<CollectionBinding>), PathError> {
    let Some(index) = raw.find("[*]") else {
        return Ok((raw, None));
    };

    let rest = &raw[index + 3..];
    let field = if rest.is_empty() {
        None
    } else if let Some(field) = rest.strip_prefix('.') {
        let malformed = field.is_empty()
            || field.contains('.')
            || field.contains('[')
            || field.contains(']');
        if malformed {
            return Err(PathError::InvalidCollectionSuffix { path: raw.to_string() });
        }
        Some(field.to_string())
    } else {
        return Err(PathError::InvalidCollectionSuffix { path: raw.to_string() });
    };

    Ok((&raw[..index], Some(CollectionBinding { field })))
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.context, self.segments.join("."))?;
        if let Some(ref binding) = self.collection {
            write!(f, "[*]")?;
            if let Some(ref field) = binding.field {
                write!(f, ".{field}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for AttributePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AttributePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from parsing an attribute path.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The path has no recognizable `<context>.` prefix.
    #[error(
        "Attribute '{path}' must start with one of subject., resource., path., body., query., header."
    )]
    MissingContext {
        /// The offending path.
        path: String,
    },

    /// The context prefix is not one of the six supported contexts.
    #[error("Attribute '{path}' uses unknown context '{context}'")]
    UnknownContext {
        /// The offending path.
        path: String,
        /// The unrecognized prefix.
        context: String,
    },

    /// A dotted segment is empty.
    #[error("Attribute '{path}' contains an empty path segment")]
    EmptySegment {
        /// The offending path.
        path: String,
    },

    /// The collection suffix is not `[*]` or `[*].<field>` at the end of
    /// the path.
    #[error("Attribute '{path}' has a malformed collection suffix (expected '[*]' or '[*].<field>')")]
    InvalidCollectionSuffix {
        /// The offending path.
        path: String,
    },
}

// =============================================================================
// Tests
// =============================================================================
