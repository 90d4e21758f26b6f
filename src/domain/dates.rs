// src/domain/dates.rs
//! Lenient date parsing for values coming from forms and older exports.
//!
//! Accepted inputs: `2025-01-05`, `2025-01-05T10:30`, `2025-01-05T10:30:00`,
//! `2025-01-05 10:30:00`, and RFC 3339 timestamps such as
//! `2025-01-05T10:30:00.000Z` (converted to UTC wall time).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

use super::DomainError;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, DomainError> {
    let value = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DomainError::InvalidDate(input.to_string()))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, DomainError> {
    parse_datetime(input).map(|dt| dt.date())
}

/// serde adapter: `#[serde(deserialize_with = "dates::lenient_date")]`
pub fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub fn lenient_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            parse_date(&raw).map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Empty string and null both mean "no interview scheduled".
pub fn lenient_datetime_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_datetime(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let dt = parse_datetime("2025-01-05").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_parse_datetime_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-01-05T10:30").unwrap(), expected);
        assert_eq!(parse_datetime("2025-01-05T10:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2025-01-05 10:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2025-01-05T10:30:00.000Z").unwrap(), expected);
        assert_eq!(parse_datetime("2025-01-05T12:30:00+02:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            parse_date("05/01/2025"),
            Err(DomainError::InvalidDate("05/01/2025".to_string()))
        );
    }
}
