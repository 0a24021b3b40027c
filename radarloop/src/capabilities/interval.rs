//! ISO-8601 interval expansion for time dimensions.
//!
//! Servers that do not enumerate their frames advertise them as
//! `start/end/period`, e.g. `2024-01-01T00:00:00Z/2024-01-01T00:30:00Z/PT5M`.

use chrono::TimeDelta;

use crate::time::{format_utc_seconds, parse_instant};

/// Parse an ISO-8601 duration such as `PT5M`, `P1DT2H` or `PT1.5S`.
///
/// Supports days, hours, minutes and (fractional) seconds. Missing
/// components count as zero. Returns `None` for anything else, including
/// year, month and week designators.
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let rest = text.trim().strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.map_or(true, str::is_empty) {
        return None;
    }

    let mut millis = 0.0_f64;
    for (value, designator) in components(date_part)? {
        match designator {
            'D' => millis += value * 86_400_000.0,
            _ => return None,
        }
    }
    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        for (value, designator) in components(time_part)? {
            match designator {
                'H' => millis += value * 3_600_000.0,
                'M' => millis += value * 60_000.0,
                'S' => millis += value * 1_000.0,
                _ => return None,
            }
        }
    }

    if !millis.is_finite() || millis > i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::milliseconds(millis.round() as i64))
}

/// Split `1D2H` style text into `(value, designator)` pairs.
fn components(text: &str) -> Option<Vec<(f64, char)>> {
    let mut out = Vec::new();
    let mut number = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else {
            if number.is_empty() || out.iter().any(|(_, d)| *d == c) {
                return None;
            }
            out.push((number.parse::<f64>().ok()?, c));
            number.clear();
        }
    }
    number.is_empty().then_some(out)
}

/// Expand `start/end/period` into discrete timestamps, keeping the last `max_frames`.
///
/// Malformed input (wrong segment count, unparseable dates, non-positive
/// period, end before start) yields an empty list.
pub fn expand_interval(expr: &str, max_frames: usize) -> Vec<String> {
    let parts: Vec<&str> = expr.trim().split('/').collect();
    let [start, end, period] = parts.as_slice() else {
        return Vec::new();
    };
    let (Some(start), Some(end), Some(period)) =
        (parse_instant(start), parse_instant(end), parse_duration(period))
    else {
        return Vec::new();
    };

    let step_ms = period.num_milliseconds();
    if step_ms <= 0 || end < start || max_frames == 0 {
        return Vec::new();
    }

    let span_ms = (end - start).num_milliseconds();
    let count = span_ms / step_ms + 1;
    let first = (count - max_frames as i64).max(0);

    (first..count)
        .map(|i| format_utc_seconds(start + TimeDelta::milliseconds(i * step_ms)))
        .collect()
}
