//! Publication date normalization.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Formats shown to authors when a date cannot be read.
pub const ACCEPTED_DATE_FORMATS: &str =
    "YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS] or RFC 3339 (2024-05-01T09:30:00+09:00)";

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Interpret a front-matter date in the reference timezone.
///
/// Dates and local times are taken as wall-clock time in `tz`; timestamps
/// that carry their own offset are converted into it.
pub fn normalize_date(raw: &str, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&tz));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return tz.from_local_datetime(&naive).single();
        }
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    tz.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).single()
}

static OFFSET_REGEX: OnceLock<Regex> = OnceLock::new();

fn offset_regex() -> &'static Regex {
    OFFSET_REGEX.get_or_init(|| Regex::new(r"^(?:UTC)?([+-])(\d{2}):?(\d{2})$").unwrap())
}

/// Parse a fixed UTC offset such as `+09:00`, `-0530` or `UTC`.
pub fn parse_offset(spec: &str) -> Option<FixedOffset> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("utc") || spec == "Z" {
        return FixedOffset::east_opt(0);
    }

    let captures = offset_regex().captures(spec)?;
    let hours: i32 = captures[2].parse().ok()?;
    let minutes: i32 = captures[3].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    match &captures[1] {
        "-" => FixedOffset::west_opt(seconds),
        _ => FixedOffset::east_opt(seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn tokyo() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_plain_date_is_midnight_in_reference_zone() {
        let dt = normalize_date("2025-01-15", tokyo()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T00:00:00+09:00");
    }

    #[test]
    fn test_local_datetime_forms() {
        for raw in ["2025-01-15 10:30", "2025-01-15T10:30", "2025-01-15 10:30:00"] {
            let dt = normalize_date(raw, utc()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-01-15T10:30:00+00:00", "{raw}");
        }
    }

    #[test]
    fn test_offset_timestamp_is_converted() {
        let dt = normalize_date("2025-01-01T00:30:00+09:00", utc()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-12-31T15:30:00+00:00");
    }

    #[test]
    fn test_unparseable_dates() {
        assert!(normalize_date("yesterday", utc()).is_none());
        assert!(normalize_date("2025-13-01", utc()).is_none());
        assert!(normalize_date("", utc()).is_none());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+09:00"), Some(tokyo()));
        assert_eq!(parse_offset("UTC"), Some(utc()));
        assert_eq!(parse_offset("+00:00"), Some(utc()));
        assert_eq!(
            parse_offset("-0530"),
            FixedOffset::west_opt(5 * 3600 + 30 * 60)
        );
        assert_eq!(parse_offset("Asia/Tokyo"), None);
        assert_eq!(parse_offset("+25:00"), None);
    }
}
