//! Provider timestamp normalization.
//!
//! CloudWatch sends `2021-08-25T13:29:39.389+0000` style values that are read as
//! naive UTC up to the seconds. The Health Dashboard sends RFC 2822 style values
//! such as `Sat, 04 Jun 2016 05:01:10 GMT`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::{Error, Result};

const CLOUDWATCH_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const HEALTH_FORMAT: &str = "%d %b %Y %H:%M:%S";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `YYYY-MM-DDTHH:MM:SS[.fraction]`, anything after the first `.` is dropped
    CloudWatch,
    /// `Ddd, DD Mon YYYY HH:MM:SS TZ`
    Health,
}

/// Either an instant the caller already holds or provider text.
#[derive(Debug, Clone, Copy)]
pub enum RawTimestamp<'a> {
    Instant(DateTime<Utc>),
    Text(&'a str),
}

impl TimestampFormat {
    pub fn parse(self, raw: &str) -> Result<DateTime<Utc>> {
        match self {
            TimestampFormat::CloudWatch => parse_cloudwatch(raw),
            TimestampFormat::Health => parse_health(raw),
        }
    }
}

pub fn normalize(raw: RawTimestamp<'_>, format: TimestampFormat) -> Result<DateTime<Utc>> {
    match raw {
        RawTimestamp::Instant(at) => Ok(at),
        RawTimestamp::Text(text) => format.parse(text),
    }
}

/// Reads a timestamp field from a payload. A missing or null field means "now".
pub fn from_field(value: Option<&Value>, format: TimestampFormat) -> Result<DateTime<Utc>> {
    match value {
        None | Some(Value::Null) => Ok(Utc::now()),
        Some(Value::String(text)) => normalize(RawTimestamp::Text(text), format),
        Some(other) => Err(Error::TimestampParse(format!(
            "expected a timestamp string, got {}",
            other
        ))),
    }
}

fn parse_cloudwatch(raw: &str) -> Result<DateTime<Utc>> {
    let seconds = raw.split_once('.').map_or(raw, |(head, _)| head).trim();
    NaiveDateTime::parse_from_str(seconds, CLOUDWATCH_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::TimestampParse(format!("'{}': {}", raw, e)))
}

fn parse_health(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| Error::TimestampParse(format!("'{}': {}", raw, reason));

    let (weekday, rest) = trimmed
        .split_once(',')
        .ok_or_else(|| invalid("missing weekday"))?;
    // Not checked against the date, the provider sometimes sends a wrong weekday.
    if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday.trim())) {
        return Err(invalid("unknown weekday"));
    }

    let (body, zone) = rest
        .trim()
        .rsplit_once(' ')
        .ok_or_else(|| invalid("missing zone"))?;

    match zone.to_ascii_uppercase().as_str() {
        "GMT" | "UTC" | "UT" | "Z" => NaiveDateTime::parse_from_str(body.trim(), HEALTH_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| invalid(&e.to_string())),
        _ => DateTime::parse_from_rfc2822(trimmed)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| invalid(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_cloudwatch_drops_fraction_and_offset() {
        let expected = Utc.with_ymd_and_hms(2021, 8, 25, 13, 29, 39).unwrap();
        let format = TimestampFormat::CloudWatch;
        assert_eq!(format.parse("2021-08-25T13:29:39.389+0000").unwrap(), expected);
        assert_eq!(format.parse("2021-08-25T13:29:39").unwrap(), expected);
        assert_eq!(format.parse("2021-08-25T13:29:39.").unwrap(), expected);
    }

    #[test]
    fn test_cloudwatch_rejects_other_shapes() {
        let format = TimestampFormat::CloudWatch;
        assert!(matches!(format.parse("2021-08-25 13:29:39"), Err(Error::TimestampParse(_))));
        assert!(format.parse("2021-08-25T13:29:39+0000").is_err());
        assert!(format.parse("").is_err());
        assert!(format.parse("Sat, 04 Jun 2016 05:01:10 GMT").is_err());
    }

    #[test]
    fn test_health_format() {
        let format = TimestampFormat::Health;
        assert_eq!(
            format.parse("Sat, 04 Jun 2016 05:01:10 GMT").unwrap(),
            Utc.with_ymd_and_hms(2016, 6, 4, 5, 1, 10).unwrap()
        );
        // 5 June 2016 was a Sunday
        assert_eq!(
            format.parse("Sat, 05 Jun 2016 15:10:09 GMT").unwrap(),
            Utc.with_ymd_and_hms(2016, 6, 5, 15, 10, 9).unwrap()
        );
        assert_eq!(
            format.parse("Wed, 01 Aug 2018 06:27:57 UTC").unwrap(),
            Utc.with_ymd_and_hms(2018, 8, 1, 6, 27, 57).unwrap()
        );
    }

    #[test]
    fn test_health_numeric_offset() {
        assert_eq!(
            TimestampFormat::Health.parse("Wed, 01 Aug 2018 08:27:57 +0200").unwrap(),
            Utc.with_ymd_and_hms(2018, 8, 1, 6, 27, 57).unwrap()
        );
    }

    #[test]
    fn test_health_rejects_garbage() {
        let format = TimestampFormat::Health;
        assert!(format.parse("not a date").is_err());
        assert!(format.parse("04 Jun 2016 05:01:10 GMT").is_err());
        assert!(format.parse("Sat, 04 Jun 2016 05:01:10").is_err());
        assert!(format.parse("2016-06-04T05:01:10Z").is_err());
    }

    #[test]
    fn test_health_rejects_unknown_weekday() {
        let format = TimestampFormat::Health;
        assert!(matches!(
            format.parse("Xyz, 04 Jun 2016 05:01:10 GMT"),
            Err(Error::TimestampParse(_))
        ));
        assert!(format.parse("Saturday, 04 Jun 2016 05:01:10 GMT").is_err());
        assert!(format.parse("sat, 04 Jun 2016 05:01:10 GMT").is_ok());
    }

    #[test]
    fn test_from_field_defaults_to_now() {
        let before = Utc::now();
        let at = from_field(None, TimestampFormat::CloudWatch).unwrap();
        assert!(at >= before && at <= Utc::now());
        assert!(from_field(Some(&Value::Null), TimestampFormat::Health).is_ok());
    }

    #[test]
    fn test_from_field_rejects_non_strings() {
        let value = json!(1629898179);
        assert!(matches!(
            from_field(Some(&value), TimestampFormat::CloudWatch),
            Err(Error::TimestampParse(_))
        ));
    }

    #[test]
    fn test_instant_passes_through() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(normalize(RawTimestamp::Instant(at), TimestampFormat::Health).unwrap(), at);
    }
}
