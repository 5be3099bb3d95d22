//! Event time parsing for CSV date columns
//!
//! The exports seen in practice use RFC 3339, ISO dates with or without a
//! time component, and the US `M/D/YYYY H:MM` layout of the Online Retail
//! dataset. Times without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a CSV date cell, returning `None` when no known layout matches
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_online_retail_layout() {
        let parsed = parse_event_time("12/1/2010 8:26").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2010, 12, 1, 8, 26, 0).unwrap());
    }

    #[test]
    fn test_iso_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(parse_event_time("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(parse_event_time("2024-03-05T14:30:00"), Some(expected));
        assert_eq!(parse_event_time("2024-03-05 14:30"), Some(expected));
    }

    #[test]
    fn test_rfc3339_offset_converted_to_utc() {
        let parsed = parse_event_time("2024-03-05T16:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_date_only_is_midnight() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_event_time("2024-03-05"), Some(expected));
        assert_eq!(parse_event_time("3/5/2024"), Some(expected));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(parse_event_time(""), None);
        assert_eq!(parse_event_time("   "), None);
        assert_eq!(parse_event_time("yesterday"), None);
        assert_eq!(parse_event_time("2024-13-40"), None);
    }
}
