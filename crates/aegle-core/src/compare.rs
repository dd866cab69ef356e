//! Type-aware comparison primitives.
//!
//! These are the building blocks leaf predicates dispatch to: a robust
//! equality that reconciles different encodings of the same datum, plus
//! domain-checked ordering, string, and time comparisons that report which
//! operand fell outside the domain.
//!
//! Equality is deliberately forgiving across encodings (a UUID equals its
//! canonical string form, an integer equals the float it widens to) but
//! never across kinds: a string that merely looks numeric does not compare
//! equal to a number.

use std::cmp::Ordering;
use std::fmt;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::time::{from_unix_seconds, parse_instant};
use crate::value::Value;

// =============================================================================
// Errors
// =============================================================================

/// Which side of a comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The attribute side.
    Left,
    /// The comparison-target side.
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Errors from domain-checked comparisons.
///
/// Each variant names the offending operand so denial diagnostics can point
/// at the attribute or the target, not just "a comparison failed."
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// The operand is not coercible to a number.
    #[error("{side} operand is not numeric: {value}")]
    NotNumeric {
        /// The offending side.
        side: Operand,
        /// Diagnostic rendering of the operand.
        value: String,
    },

    /// The operand is not a string.
    #[error("{side} operand is not a string: {value}")]
    NotString {
        /// The offending side.
        side: Operand,
        /// Diagnostic rendering of the operand.
        value: String,
    },

    /// The operand is not coercible to an instant.
    #[error("{side} operand is not a date/time: {value}")]
    NotInstant {
        /// The offending side.
        side: Operand,
        /// Diagnostic rendering of the operand.
        value: String,
    },
}

impl CompareError {
    fn not_numeric(side: Operand, value: &Value) -> Self {
        Self::NotNumeric {
            side,
            value: value.to_string(),
        }
    }

    fn not_string(side: Operand, value: &Value) -> Self {
        Self::NotString {
            side,
            value: value.to_string(),
        }
    }

    fn not_instant(side: Operand, value: &Value) -> Self {
        Self::NotInstant {
            side,
            value: value.to_string(),
        }
    }
}

// =============================================================================
// Coercions
// =============================================================================

/// Normalize a value to a UUID: native UUIDs pass through, strings are
/// parsed. Everything else is not a UUID.
#[must_use]
pub fn as_uuid(value: &Value) -> Option<Uuid> {
    match value {
        Value::Uuid(id) => Some(*id),
        Value::String(raw) => Uuid::parse_str(raw).ok(),
        _ => None,
    }
}

/// Coerce a value to an instant: native times pass through, strings go
/// through [`parse_instant`], numbers are Unix seconds (fractional part as
/// sub-second precision).
#[must_use]
pub fn as_instant(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::Time(instant) => Some(*instant),
        Value::String(raw) => parse_instant(raw).ok(),
        Value::Number(seconds) => from_unix_seconds(*seconds).ok(),
        _ => None,
    }
}

// =============================================================================
// Equality
// =============================================================================

/// Encoding-tolerant equality.
///
/// - Numbers compare by 64-bit float, whatever width they started as.
/// - If either side is a UUID (or a string that parses as one), both sides
///   are normalized to UUID; a side that cannot normalize is not equal.
/// - Booleans compare by identity, times by instant.
/// - Otherwise equal-typed values compare structurally (lists elementwise,
///   objects keywise) and mismatched kinds are not equal. In particular a
///   numeric-looking string never equals a number.
#[must_use]
pub fn robust_eq(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
        return a == b;
    }

    let left_uuid = as_uuid(left);
    let right_uuid = as_uuid(right);
    if left_uuid.is_some() || right_uuid.is_some() {
        return match (left_uuid, right_uuid) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }

    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Time(a), Value::Time(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| robust_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| robust_eq(x, y)))
        }
        _ => false,
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Compare two numeric values.
///
/// # Errors
///
/// Returns [`CompareError::NotNumeric`] naming the side that is not a
/// number. Strings are never numeric here.
pub fn compare_numbers(left: &Value, right: &Value) -> Result<Ordering, CompareError> {
    let a = left
        .as_float()
        .ok_or_else(|| CompareError::not_numeric(Operand::Left, left))?;
    let b = right
        .as_float()
        .ok_or_else(|| CompareError::not_numeric(Operand::Right, right))?;
    // JSON numbers are finite, so partial_cmp cannot miss.
    Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}

// =============================================================================
// Strings
// =============================================================================

/// Substring relation tested by [`compare_strings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    /// Left starts with right.
    StartsWith,
    /// Left ends with right.
    EndsWith,
    /// Left contains right.
    Includes,
}

/// Test a substring relation between two string values.
///
/// # Errors
///
/// Returns [`CompareError::NotString`] naming the side that is not a string.
pub fn compare_strings(op: StringOp, left: &Value, right: &Value) -> Result<bool, CompareError> {
    let a = left
        .as_str()
        .ok_or_else(|| CompareError::not_string(Operand::Left, left))?;
    let b = right
        .as_str()
        .ok_or_else(|| CompareError::not_string(Operand::Right, right))?;
    Ok(match op {
        StringOp::StartsWith => a.starts_with(b),
        StringOp::EndsWith => a.ends_with(b),
        StringOp::Includes => a.contains(b),
    })
}

// =============================================================================
// Times
// =============================================================================

/// Temporal relation tested by [`compare_times`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOp {
    /// Left is strictly before right.
    Before,
    /// Left is strictly after right.
    After,
}

/// Compare two instants, coercing each side via [`as_instant`].
///
/// # Errors
///
/// Returns [`CompareError::NotInstant`] naming the side that cannot be
/// interpreted as an instant.
pub fn compare_times(op: TimeOp, left: &Value, right: &Value) -> Result<bool, CompareError> {
    let a = as_instant(left).ok_or_else(|| CompareError::not_instant(Operand::Left, left))?;
    let b = as_instant(right).ok_or_else(|| CompareError::not_instant(Operand::Right, right))?;
    Ok(match op {
        TimeOp::Before => a < b,
        TimeOp::After => a > b,
    })
}

// =============================================================================
// Tests
// =============================================================================
