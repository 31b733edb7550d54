//! OAI-PMH datestamps and their granularity.
//!
//! The protocol allows exactly two literal forms for `from` and `until`:
//! `YYYY-MM-DD` (day granularity) and `YYYY-MM-DDThh:mm:ssZ` (seconds
//! granularity, always UTC).

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Point in time carried by a parsed datestamp.
pub type Timestamp = DateTime<Utc>;

/// Day granularity pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Seconds granularity pattern: YYYY-MM-DDThh:mm:ssZ.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex")
});

/// Precision of a datestamp.
///
/// Ordered by precision: `Date < DateTime`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Granularity {
    /// `YYYY-MM-DD`
    #[serde(rename = "YYYY-MM-DD", alias = "date")]
    Date,

    /// `YYYY-MM-DDThh:mm:ssZ`
    #[default]
    #[serde(rename = "YYYY-MM-DDThh:mm:ssZ", alias = "datetime")]
    DateTime,
}

impl Granularity {
    /// Get the string used for this granularity in `Identify` responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "YYYY-MM-DD",
            Self::DateTime => "YYYY-MM-DDThh:mm:ssZ",
        }
    }

    /// Render a timestamp at this granularity.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use oaipmh_provider::granularity::Granularity;
    ///
    /// let ts = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    /// assert_eq!(Granularity::Date.format(&ts), "2020-01-02");
    /// assert_eq!(Granularity::DateTime.format(&ts), "2020-01-02T03:04:05Z");
    /// ```
    #[must_use]
    pub fn format(&self, timestamp: &Timestamp) -> String {
        match self {
            Self::Date => timestamp.format("%Y-%m-%d").to_string(),
            Self::DateTime => timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `from`/`until` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OaiDate {
    /// The instant. Day-granularity dates start at midnight UTC.
    pub timestamp: Timestamp,

    /// The form the date was written in.
    pub granularity: Granularity,
}

/// Parse an OAI-PMH datestamp and classify its granularity.
///
/// # Arguments
/// * `value` - Raw argument value
///
/// # Returns
/// * `Ok(OaiDate)` for `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ssZ`
/// * `Err(ProtocolError::BadArgument)` for any other form, or for a
///   calendar-invalid date such as month 13
///
/// # Examples
/// ```
/// use oaipmh_provider::granularity::{parse_date, Granularity};
///
/// assert_eq!(parse_date("2020-01-01").unwrap().granularity, Granularity::Date);
/// assert_eq!(
///     parse_date("2020-01-01T00:00:00Z").unwrap().granularity,
///     Granularity::DateTime
/// );
/// assert!(parse_date("not-a-date").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<OaiDate, ProtocolError> {
    if DATE_PATTERN.is_match(value) {
        let timestamp = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| invalid_date(value))?;
        return Ok(OaiDate {
            timestamp,
            granularity: Granularity::Date,
        });
    }

    if DATETIME_PATTERN.is_match(value) {
        let timestamp = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
            .map_err(|_| invalid_date(value))?
            .and_utc();
        return Ok(OaiDate {
            timestamp,
            granularity: Granularity::DateTime,
        });
    }

    Err(invalid_date(value))
}

fn invalid_date(value: &str) -> ProtocolError {
    ProtocolError::BadArgument(format!(
        "Invalid date: '{value}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_day_granularity() {
        let parsed = parse_date("2020-01-01").unwrap();
        assert_eq!(parsed.granularity, Granularity::Date);
        assert_eq!(
            parsed.timestamp,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_seconds_granularity() {
        let parsed = parse_date("2020-01-01T13:45:30Z").unwrap();
        assert_eq!(parsed.granularity, Granularity::DateTime);
        assert_eq!(
            parsed.timestamp,
            Utc.with_ymd_and_hms(2020, 1, 1, 13, 45, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_invalid_format() {
        for value in [
            "not-a-date",
            "",
            "2020/01/01",
            "2020-1-1",
            "20-01-01",
            "2020-01-01T00:00:00",
            "2020-01-01T00:00Z",
            "2020-01-01T00:00:00.000Z",
            "2020-01-01T00:00:00+01:00",
            " 2020-01-01",
        ] {
            let err = parse_date(value).unwrap_err();
            assert!(
                matches!(err, ProtocolError::BadArgument(_)),
                "expected badArgument for {value:?}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_calendar_date() {
        assert!(parse_date("2020-13-01").is_err()); // Invalid month
        assert!(parse_date("2021-02-29").is_err()); // Not a leap year
        assert!(parse_date("2020-00-10").is_err()); // Zero month
        assert!(parse_date("2020-01-01T24:00:00Z").is_err()); // Invalid hour
        assert!(parse_date("2020-02-29").is_ok()); // Leap year
    }

    #[test]
    fn test_error_message_names_value() {
        let err = parse_date("yesterday").unwrap_err();
        assert!(err.message().contains("yesterday"));
    }

    #[test]
    fn test_granularity_order() {
        assert!(Granularity::Date < Granularity::DateTime);
        assert_eq!(Granularity::default(), Granularity::DateTime);
    }

    #[test]
    fn test_granularity_deserialize() {
        let g: Granularity = serde_yaml_ng::from_str("YYYY-MM-DD").unwrap();
        assert_eq!(g, Granularity::Date);
        let g: Granularity = serde_yaml_ng::from_str("datetime").unwrap();
        assert_eq!(g, Granularity::DateTime);
    }
}
