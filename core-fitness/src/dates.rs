//! Date parsing and formatting at the caller boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use core_runtime::TimeZonePolicy;

use crate::error::{FitnessError, Result};

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Offset date-times without seconds, which RFC 3339 parsing rejects.
const OFFSET_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, the shape JavaScript's `toISOString` produces.
pub fn to_iso_string(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a caller-supplied date string.
///
/// Accepted forms:
/// - RFC 3339 with an offset, or `YYYY-MM-DDTHH:MM` followed by `Z` or an
///   offset: taken as the instant it names
/// - `YYYY-MM-DD`: midnight UTC
/// - `YYYY-MM-DDTHH:MM[:SS[.fff]]`: wall-clock time in `zone`
pub fn parse_date_string(input: &str, zone: TimeZonePolicy) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    let invalid = |reason: &str| FitnessError::InvalidDate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("empty date"));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    if let Some(instant) = OFFSET_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(instant.with_timezone(&Utc));
    }

    if let Some(utc) = trimmed.strip_suffix(['Z', 'z']) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(utc, "%Y-%m-%dT%H:%M") {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| invalid("expected an ISO-8601 date or date-time"))?;

    zone.resolve(naive)
        .ok_or_else(|| invalid("time does not exist in the configured time zone"))
}
