//! Normalization of the timestamp strings emitted by the Linode API.
//!
//! The API is inconsistent about fractional seconds, zone designators and the date/time
//! separator. Timestamps without a zone are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Zone-less layouts tried after RFC 3339, in priority order.
///
/// `%.f` also matches when the fraction is absent.
pub const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a raw timestamp into a UTC instant.
///
/// # Errors
///
/// Returns [`Error::TimestampFormat`] when no accepted layout matches.
pub fn parse(raw: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::TimestampFormat(raw.to_string()))
}

/// Parse an optional raw timestamp; an absent value is not an error.
///
/// # Errors
///
/// Returns [`Error::TimestampFormat`] when a present value matches no accepted layout.
pub fn parse_optional(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(parse).transpose()
}
