//! Runtime value model for attribute resolution and comparison.
//!
//! Context attributes arrive either as JSON (request bodies, query strings,
//! stored resource snapshots) or as typed data the host already holds
//! (timestamps, UUIDs). Both map onto the closed set of variants defined
//! here, and every comparator in [`crate::compare`] pattern-matches
//! exhaustively on this set instead of re-discovering types per operator.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::time::format_instant;

/// Number of list elements shown before a diagnostic rendering is elided.
const LIST_PREVIEW: usize = 5;

/// Longest string rendered verbatim in diagnostics.
const STRING_PREVIEW: usize = 60;

// =============================================================================
// Value
// =============================================================================

/// A runtime attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent data or an explicit JSON null.
    Null,
    /// A boolean, compared by identity.
    Bool(bool),
    /// Any numeric width, carried as a 64-bit float.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// A point in time, compared as a UTC instant.
    Time(OffsetDateTime),
    /// A UUID, equal to its canonical string encoding under
    /// [`crate::compare::robust_eq`].
    Uuid(Uuid),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// A string-keyed map of values.
    Object(HashMap<String, Value>),
}

impl Value {
    /// Convert a JSON value structurally.
    ///
    /// Numbers coerce to 64-bit floats; strings stay strings even when they
    /// look like numbers, timestamps, or UUIDs. Operator-specific coercion
    /// happens later, in the comparators.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => {
                number.as_f64().map_or(Self::Null, Self::Number)
            }
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Render back to JSON. Times become RFC 3339 strings, UUIDs their
    /// canonical string form.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(flag) => serde_json::Value::Bool(*flag),
            Self::Number(number) => serde_json::Number::from_f64(*number)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(text) => serde_json::Value::String(text.clone()),
            Self::Time(instant) => serde_json::Value::String(format_instant(*instant)),
            Self::Uuid(id) => serde_json::Value::String(id.to_string()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// The variant name, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Time(_) => "time",
            Self::Uuid(_) => "uuid",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric coercion: only [`Value::Number`] is numeric. Numeric-looking
    /// strings are deliberately not parsed here.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Borrow the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the list content, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the object content, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Number(number as f64)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(instant: OffsetDateTime) -> Self {
        Self::Time(instant)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

// =============================================================================
// Diagnostic Rendering
// =============================================================================

/// Diagnostic form used in denial explanations. Large strings and
/// collections are summarized rather than dumped.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::String(text) => {
                if text.chars().count() <= STRING_PREVIEW {
                    write!(f, "\"{text}\"")
                } else {
                    let preview: String = text.chars().take(STRING_PREVIEW).collect();
                    write!(f, "\"{preview}…\"")
                }
            }
            Self::Time(instant) => write!(f, "{}", format_instant(*instant)),
            Self::Uuid(id) => write!(f, "{id}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().take(LIST_PREVIEW).enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() > LIST_PREVIEW {
                    write!(f, ", … (+{} more)", items.len() - LIST_PREVIEW)?;
                }
                write!(f, "]")
            }
            Self::Object(fields) => write!(f, "object({} fields)", fields.len()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    // -------------------------------------------------------------------------
    // JSON Conversion Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(json!(null)), Value::Null);
        assert_eq!(Value::from_json(json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(json!(42)), Value::Number(42.0));
        assert_eq!(Value::from_json(json!(2.5)), Value::Number(2.5));
        assert_eq!(
            Value::from_json(json!("admin")),
            Value::String("admin".to_string())
        );
    }

    #[test]
    fn test_from_json_keeps_numeric_strings_as_strings() {
        let value = Value::from_json(json!("123"));
        assert_eq!(value, Value::String("123".to_string()));
        assert!(value.as_float().is_none());
    }

    #[test]
    fn test_from_json_nested() {
        let value = Value::from_json(json!({
            "branch": { "id": 7 },
            "tags": ["vip", "staff"]
        }));

        let fields = value.as_object().unwrap();
        let branch = fields.get("branch").unwrap().as_object().unwrap();
        assert_eq!(branch.get("id"), Some(&Value::Number(7.0)));

        let tags = fields.get("tags").unwrap().as_list().unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_to_json_roundtrip() {
        let original = json!({
            "active": true,
            "count": 3.0,
            "name": "west wing",
            "nested": { "flag": null }
        });

        assert_eq!(Value::from_json(original.clone()).to_json(), original);
    }

    #[test]
    fn test_to_json_time_and_uuid() {
        let instant = datetime!(2025-03-01 09:30:00 UTC);
        assert_eq!(
            Value::Time(instant).to_json(),
            json!("2025-03-01T09:30:00Z")
        );

        let id = Uuid::new_v4();
        assert_eq!(Value::Uuid(id).to_json(), json!(id.to_string()));
    }

    // -------------------------------------------------------------------------
    // Accessor Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_as_float_numbers_only() {
        assert_eq!(Value::Number(1.5).as_float(), Some(1.5));
        assert!(Value::String("1.5".to_string()).as_float().is_none());
        assert!(Value::Bool(true).as_float().is_none());
        assert!(Value::Null.as_float().is_none());
    }

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
        assert!(!Value::String(String::new()).is_null());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Number(0.0).type_name(), "number");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Object(HashMap::new()).type_name(), "object");
    }

    // -------------------------------------------------------------------------
    // Display Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::from("admin").to_string(), "\"admin\"");
    }

    #[test]
    fn test_display_long_string_truncated() {
        let long = "x".repeat(200);
        let rendered = Value::from(long).to_string();
        assert!(rendered.ends_with("…\""));
        assert!(rendered.len() < 100);
    }

    #[test]
    fn test_display_large_list_summarized() {
        let items: Vec<Value> = (0..12).map(Value::from).collect();
        let rendered = Value::List(items).to_string();
        assert!(rendered.contains("… (+7 more)"));
    }

    #[test]
    fn test_display_object_summarized() {
        let mut fields = HashMap::new();
        fields.insert("a".to_string(), Value::Number(1.0));
        fields.insert("b".to_string(), Value::Number(2.0));
        assert_eq!(Value::Object(fields).to_string(), "object(2 fields)");
    }
}
