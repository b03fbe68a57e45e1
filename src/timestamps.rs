//! Timestamp parsing shared by the harmonizer, validator and quality checker.
//!
//! The personal weather station feed has emitted several timestamp layouts
//! over firmware and software versions. [`TIMESTAMP_CASCADE`] lists the
//! accepted layouts in priority order; [`normalize_timestamp`] returns the
//! first one that parses. New layouts are added to the list, not to the
//! call sites.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").expect("valid time-of-day regex"));

static TWELVE_HOUR_TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}:\d{2}(:\d{2})? ?[AaPp][Mm]$").expect("valid 12 hour time-of-day regex")
});

const TWELVE_HOUR_TIME_LAYOUTS: &[&str] = &["%I:%M %p", "%I:%M:%S %p", "%I:%M%p", "%I:%M:%S%p"];

/// Naive date-time layouts accepted once spaces have been turned into `T`
const ISO_NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// One layout attempt in the normalization cascade
#[derive(Debug, Clone, Copy)]
pub enum TimestampFormat {
    /// US month/day/two-digit-year with a 12 hour clock, e.g. `02/07/26 1:05 PM`
    UsTwelveHour(&'static str),
    /// Bare `H:MM[:SS]`, completed with the caller's reference date
    TimeOfDay,
    /// Bare `h:MM[:SS] AM`, completed with the caller's reference date
    TwelveHourTimeOfDay,
    /// ISO date or date-time after replacing spaces with `T`
    IsoDateTime,
    /// Anything else ISO 8601 can express, offsets included
    IsoFallback,
}

pub const TIMESTAMP_CASCADE: &[TimestampFormat] = &[
    TimestampFormat::UsTwelveHour("%m/%d/%y %I:%M %p"),
    TimestampFormat::UsTwelveHour("%m/%d/%y %I:%M:%S %p"),
    TimestampFormat::TimeOfDay,
    TimestampFormat::TwelveHourTimeOfDay,
    TimestampFormat::IsoDateTime,
    TimestampFormat::IsoFallback,
];

impl TimestampFormat {
    fn attempt(&self, raw: &str, reference_date: Option<NaiveDate>) -> Option<String> {
        match self {
            TimestampFormat::UsTwelveHour(layout) => NaiveDateTime::parse_from_str(raw, layout)
                .ok()
                .map(format_naive),
            TimestampFormat::TimeOfDay => {
                let date = reference_date?;
                if !TIME_OF_DAY.is_match(raw) {
                    return None;
                }
                let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                    .ok()?;
                Some(format_naive(date.and_time(time)))
            }
            TimestampFormat::TwelveHourTimeOfDay => {
                let date = reference_date?;
                if !TWELVE_HOUR_TIME_OF_DAY.is_match(raw) {
                    return None;
                }
                let time = TWELVE_HOUR_TIME_LAYOUTS
                    .iter()
                    .find_map(|layout| NaiveTime::parse_from_str(raw, layout).ok())?;
                Some(format_naive(date.and_time(time)))
            }
            TimestampFormat::IsoDateTime => {
                let candidate = raw.replace(' ', "T");
                ISO_NAIVE_LAYOUTS
                    .iter()
                    .find_map(|layout| NaiveDateTime::parse_from_str(&candidate, layout).ok())
                    .or_else(|| {
                        NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
                    .map(format_naive)
            }
            TimestampFormat::IsoFallback => {
                let candidate = raw.replace(' ', "T");
                if let Some(aware) = parse_aware(&candidate) {
                    return Some(aware.to_rfc3339_opts(SecondsFormat::AutoSi, false));
                }
                NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(format_naive)
            }
        }
    }
}

/// Normalizes a raw timestamp through [`TIMESTAMP_CASCADE`].
///
/// `reference_date` completes bare times of day. Returns `None` when no
/// layout matches.
pub fn normalize_timestamp(raw: &str, reference_date: Option<NaiveDate>) -> Option<String> {
    let cleaned = raw.replace('\u{a0}', " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = TIMESTAMP_CASCADE
        .iter()
        .find_map(|format| format.attempt(cleaned, reference_date));

    if normalized.is_none() {
        tracing::debug!("No timestamp layout matched '{}'", cleaned);
    }
    normalized
}

/// Parses an ISO 8601 timestamp into UTC.
///
/// A trailing `Z` and explicit offsets are honoured; timezone-naive values
/// are treated as UTC. A date without a time means midnight.
pub fn parse_iso_utc(raw: &str) -> Option<DateTime<Utc>> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return None;
    }
    let candidate = candidate.replace(' ', "T");

    if let Some(aware) = parse_aware(&candidate) {
        return Some(aware.with_timezone(&Utc));
    }

    const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(&candidate, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn parse_aware(candidate: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(candidate)
        .or_else(|_| DateTime::parse_from_str(candidate, "%Y-%m-%dT%H:%M%:z"))
        .ok()
}

fn format_naive(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_us_twelve_hour_layouts() {
        assert_eq!(
            normalize_timestamp("02/07/26 1:05 PM", None).as_deref(),
            Some("2026-02-07T13:05:00")
        );
        assert_eq!(
            normalize_timestamp("02/07/26 12:05:30 AM", None).as_deref(),
            Some("2026-02-07T00:05:30")
        );
    }

    #[test]
    fn test_time_of_day_needs_reference_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        assert_eq!(
            normalize_timestamp("14:30", Some(date)).as_deref(),
            Some("2026-02-07T14:30:00")
        );
        assert_eq!(
            normalize_timestamp("14:30:15", Some(date)).as_deref(),
            Some("2026-02-07T14:30:15")
        );
        assert_eq!(
            normalize_timestamp("9:05", Some(date)).as_deref(),
            Some("2026-02-07T09:05:00")
        );
        assert_eq!(normalize_timestamp("14:30", None), None);
        assert_eq!(normalize_timestamp("25:30", Some(date)), None);
    }

    #[test]
    fn test_twelve_hour_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        assert_eq!(
            normalize_timestamp("12:04 AM", Some(date)).as_deref(),
            Some("2026-02-07T00:04:00")
        );
        assert_eq!(
            normalize_timestamp("1:05 pm", Some(date)).as_deref(),
            Some("2026-02-07T13:05:00")
        );
        assert_eq!(
            normalize_timestamp("11:59:30 PM", Some(date)).as_deref(),
            Some("2026-02-07T23:59:30")
        );
        assert_eq!(normalize_timestamp("12:04 AM", None), None);
        assert_eq!(normalize_timestamp("13:04 PM", Some(date)), None);
    }

    #[test]
    fn test_iso_layouts() {
        assert_eq!(
            normalize_timestamp("2026-02-07 14:30:00", None).as_deref(),
            Some("2026-02-07T14:30:00")
        );
        assert_eq!(
            normalize_timestamp("2026-02-07T14:30", None).as_deref(),
            Some("2026-02-07T14:30:00")
        );
        assert_eq!(
            normalize_timestamp("2026-02-07", None).as_deref(),
            Some("2026-02-07T00:00:00")
        );
        assert_eq!(
            normalize_timestamp("2026-02-07T14:30:00Z", None).as_deref(),
            Some("2026-02-07T14:30:00+00:00")
        );
        assert_eq!(
            normalize_timestamp("2026-02-07T14:30:00.250", None).as_deref(),
            Some("2026-02-07T14:30:00.250")
        );
    }

    #[test]
    fn test_non_breaking_space_is_cleaned() {
        assert_eq!(
            normalize_timestamp("02/07/26\u{a0}1:05 PM", None).as_deref(),
            Some("2026-02-07T13:05:00")
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        assert_eq!(normalize_timestamp("yesterday", None), None);
        assert_eq!(normalize_timestamp("", None), None);
        assert_eq!(normalize_timestamp("   ", None), None);
    }

    #[test]
    fn test_parse_iso_utc_treats_naive_as_utc() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 7, 14, 30, 0).unwrap();
        assert_eq!(parse_iso_utc("2026-02-07T14:30:00"), Some(expected));
        assert_eq!(parse_iso_utc("2026-02-07T14:30:00Z"), Some(expected));
        assert_eq!(parse_iso_utc("2026-02-07T15:30:00+01:00"), Some(expected));
        assert_eq!(parse_iso_utc("2026-02-07 14:30"), Some(expected));
        assert_eq!(
            parse_iso_utc("2026-02-07"),
            Some(Utc.with_ymd_and_hms(2026, 2, 7, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_iso_utc("not a date"), None);
    }
}
