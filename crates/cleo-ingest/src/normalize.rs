//! Identifier slugs and timestamp normalisation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

/// Lowercase `value` and join its whitespace-separated words with `_`.
///
/// `"  Some  Channel "` becomes `"some_channel"`.
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalise an ISO-8601 timestamp.
///
/// Returns `None` for an empty string. A `Z` suffix is read as `+00:00`.
/// Parsed values are re-emitted as `YYYY-MM-DDTHH:MM:SS[.ffffff][±HH:MM]`;
/// anything that does not parse is returned verbatim.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    Some(parse_timestamp(raw).unwrap_or_else(|| raw.to_string()))
}

fn parse_timestamp(raw: &str) -> Option<String> {
    let candidate = raw.replace('Z', "+00:00");

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(&candidate, format) {
            return (!is_leap_second(&dt.naive_local())).then(|| format_aware(&dt));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&candidate, format) {
            return (!is_leap_second(&dt)).then(|| format_naive(&dt));
        }
    }

    // Hour-only, e.g. `2023-06-01T08`.
    if candidate.len() == 13 {
        let with_minutes = format!("{}:00", candidate);
        for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&with_minutes, format) {
                return Some(format_naive(&dt));
            }
        }
    }

    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| format_naive(&dt))
}

/// chrono accepts `:60` seconds by carrying them in the nanosecond field.
/// ISO-8601 seconds stop at 59, so such values count as unparseable.
fn is_leap_second(dt: &NaiveDateTime) -> bool {
    dt.nanosecond() >= 1_000_000_000
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = dt.nanosecond() / 1_000;
    if micros == 0 {
        base
    } else {
        format!("{}.{:06}", base, micros)
    }
}

fn format_aware(dt: &DateTime<FixedOffset>) -> String {
    format!("{}{}", format_naive(&dt.naive_local()), dt.format("%:z"))
}
