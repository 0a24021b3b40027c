//! Time-related utility functions.
//!
//! Frame identifiers are ISO-8601 timestamps. Some origin servers reject
//! millisecond precision in the `TIME` parameter, so everything generated here
//! is formatted to whole seconds.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Placeholder shown before any frame has been applied.
pub const NO_TIMESTAMP: &str = "—";

/// Format an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_utc_seconds(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 (with any offset and optional fractional seconds) and
/// zone-less forms, which are taken as UTC.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let bare = text.strip_suffix('Z').unwrap_or(text);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(bare, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format a frame timestamp for display.
///
/// With `relative` set this yields `"{n} minutes ago"` measured from `now`,
/// otherwise a `YYYY-MM-DD HH:MM:SS` string. The placeholder and anything
/// unparseable are returned unchanged.
pub fn format_timestamp(text: &str, relative: bool, now: DateTime<Utc>) -> String {
    if text == NO_TIMESTAMP {
        return text.to_string();
    }
    let Some(instant) = parse_instant(text) else {
        return text.to_string();
    };

    if relative {
        let seconds = (now - instant).num_seconds();
        let minutes_ago = (seconds as f64 / 60.0).round() as i64;
        format!("{} minutes ago", minutes_ago)
    } else {
        instant.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn format_drops_subseconds() {
        let instant = parse_instant("2024-01-01T00:05:00.750Z").unwrap();
        assert_eq!(format_utc_seconds(instant), "2024-01-01T00:05:00Z");
    }

    #[test]
    fn parse_accepts_offsets_and_bare_forms() {
        assert_eq!(parse_instant("2024-01-01T01:00:00+01:00"), Some(at(0, 0, 0)));
        assert_eq!(parse_instant("2024-01-01T00:10:00"), Some(at(0, 10, 0)));
        assert_eq!(parse_instant("2024-01-01T00:10Z"), Some(at(0, 10, 0)));
        assert_eq!(parse_instant(" 2024-01-01T00:10:30Z "), Some(at(0, 10, 30)));
        assert_eq!(parse_instant("yesterday"), None);
    }

    #[test]
    fn relative_display_rounds_minutes() {
        let now = at(0, 30, 20);
        assert_eq!(
            format_timestamp("2024-01-01T00:00:00Z", true, now),
            "30 minutes ago"
        );
        assert_eq!(
            format_timestamp("2024-01-01T00:29:30Z", true, now),
            "1 minutes ago"
        );
    }

    #[test]
    fn absolute_display() {
        assert_eq!(
            format_timestamp("2024-01-01T00:05:00Z", false, at(1, 0, 0)),
            "2024-01-01 00:05:00"
        );
    }

    #[test]
    fn placeholder_and_garbage_pass_through() {
        assert_eq!(format_timestamp(NO_TIMESTAMP, true, at(0, 0, 0)), NO_TIMESTAMP);
        assert_eq!(format_timestamp("latest", false, at(0, 0, 0)), "latest");
    }
}
