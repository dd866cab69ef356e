//! Instant parsing and formatting.
//!
//! Attribute values carry timestamps in several encodings: RFC 3339 strings,
//! zone-less date/time strings, date-only strings, and Unix-second numbers.
//! Everything parsed here is normalized to UTC unless the source carried
//! explicit zone information.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// `YYYY-MM-DDTHH:MM:SS` with no zone suffix; assumed UTC.
const DATETIME_T: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// `YYYY-MM-DD HH:MM:SS` with no zone suffix; assumed UTC.
const DATETIME_SPACE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// `YYYY-MM-DD`; midnight UTC.
const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Errors that can occur while interpreting a value as an instant.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    /// The string matched none of the supported date/time encodings.
    #[error("Unparseable instant: {0}")]
    Unparseable(String),

    /// The numeric timestamp is not representable.
    #[error("Invalid Unix timestamp: {0}")]
    InvalidTimestamp(f64),
}

/// Parse a string in any of the supported date/time encodings.
///
/// # Errors
///
/// Returns [`TimeError::Unparseable`] if no encoding matches.
pub fn parse_instant(raw: &str) -> Result<OffsetDateTime, TimeError> {
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(instant);
    }
    if let Ok(naive) = PrimitiveDateTime::parse(raw, DATETIME_T) {
        return Ok(naive.assume_utc());
    }
    if let Ok(naive) = PrimitiveDateTime::parse(raw, DATETIME_SPACE) {
        return Ok(naive.assume_utc());
    }
    if let Ok(date) = Date::parse(raw, DATE_ONLY) {
        return Ok(date.midnight().assume_utc());
    }
    Err(TimeError::Unparseable(raw.to_string()))
}

/// Interpret a number as Unix seconds, with any fractional part carried as
/// sub-second precision.
///
/// # Errors
///
/// Returns [`TimeError::InvalidTimestamp`] if the number is not finite or is
/// outside the representable range.
pub fn from_unix_seconds(seconds: f64) -> Result<OffsetDateTime, TimeError> {
    if !seconds.is_finite() {
        return Err(TimeError::InvalidTimestamp(seconds));
    }
    let nanos = (seconds * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|_| TimeError::InvalidTimestamp(seconds))
}

/// Render an instant as RFC 3339 for diagnostics and JSON output.
#[must_use]
pub fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.to_string())
}

// =============================================================================
// Tests
// =============================================================================
