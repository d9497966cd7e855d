// Date handling for document timestamps. The backend is not consistent
// about how it formats creation dates, so decoding walks a short chain of
// known formats before giving up.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

/// Naive formats tried in order, before falling back to ISO-8601.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.6f", "%Y-%m-%dT%H:%M:%S"];

/// Format used when a date is written back out.
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Date string does not match any known format: {0}")]
pub struct DateParseError(pub String);

/// Parse a creation date sent by the server.
///
/// Tries `yyyy-MM-ddTHH:mm:ss.SSSSSS`, then `yyyy-MM-ddTHH:mm:ss`, then an
/// ISO-8601 internet date-time with fractional seconds. Naive timestamps
/// carry no offset and are taken as UTC.
pub fn parse_created_date(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = raw.trim();
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if has_fractional_seconds(trimmed) {
        if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(date.with_timezone(&Utc));
        }
    }

    Err(DateParseError(raw.to_string()))
}

/// The ISO-8601 fallback only accepts timestamps that carry a fraction,
/// e.g. `2024-07-03T12:34:56.789Z`.
fn has_fractional_seconds(raw: &str) -> bool {
    raw.split_once('T')
        .map(|(_, time)| time.contains('.'))
        .unwrap_or(false)
}

pub fn format_created_date(date: &DateTime<Utc>) -> String {
    date.format(OUTPUT_FORMAT).to_string()
}

/// serde adapter used by the document models (`#[serde(with = "crate::date")]`).
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_created_date(&raw).map_err(serde::de::Error::custom)
}

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_created_date(date))
}

/// Same adapter for optional dates.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_created_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => super::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }
}
