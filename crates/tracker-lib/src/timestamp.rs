//! Activity timestamp parsing
//!
//! Inventory snapshots carry `last_activity` as ISO-8601 text, sometimes with
//! an offset, sometimes naive, sometimes garbage. Parsing never fails: a bad
//! value degrades to [`ActivityTimestamp::Malformed`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityTimestamp {
    Valid(DateTime<Utc>),
    Absent,
    Malformed,
}

impl ActivityTimestamp {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Absent;
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Self::Valid(dt.with_timezone(&Utc));
        }

        // Naive values are taken to be UTC
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Self::Valid(naive.and_utc());
            }
        }

        if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Self::Valid(midnight.and_utc());
        }

        Self::Malformed
    }

    /// Whole days elapsed between the timestamp and `now`, floored.
    /// `None` unless the timestamp is valid.
    pub fn days_until(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            Self::Valid(ts) => Some((now - *ts).num_seconds().div_euclid(SECONDS_PER_DAY)),
            Self::Absent | Self::Malformed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_with_zulu() {
        let ts = ActivityTimestamp::parse(Some("2024-05-01T12:00:00Z"));
        assert_eq!(ts.days_until(now()), Some(31));
    }

    #[test]
    fn test_parse_with_offset() {
        let ts = ActivityTimestamp::parse(Some("2024-05-31T14:00:00+02:00"));
        assert_eq!(ts.days_until(now()), Some(1));
    }

    #[test]
    fn test_parse_naive_with_fraction() {
        let ts = ActivityTimestamp::parse(Some("2024-05-25T08:30:00.123456"));
        assert_eq!(ts.days_until(now()), Some(7));
    }

    #[test]
    fn test_parse_date_only() {
        let ts = ActivityTimestamp::parse(Some("2024-03-03"));
        assert!(matches!(ts, ActivityTimestamp::Valid(_)));
    }

    #[test]
    fn test_absent_and_malformed() {
        assert_eq!(ActivityTimestamp::parse(None), ActivityTimestamp::Absent);
        assert_eq!(ActivityTimestamp::parse(Some("  ")), ActivityTimestamp::Absent);
        assert_eq!(
            ActivityTimestamp::parse(Some("last tuesday")),
            ActivityTimestamp::Malformed
        );
        assert_eq!(ActivityTimestamp::Malformed.days_until(now()), None);
    }

    #[test]
    fn test_partial_day_is_floored() {
        let ts = ActivityTimestamp::Valid(now() - Duration::hours(47));
        assert_eq!(ts.days_until(now()), Some(1));

        let future = ActivityTimestamp::Valid(now() + Duration::hours(1));
        assert_eq!(future.days_until(now()), Some(-1));
    }
}
