//! Date parsing and formatting helpers

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Parse a front-matter date string.
///
/// Values without an offset are taken as UTC so builds do not depend on
/// the machine's local timezone.
pub fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;

    let offset_formats = ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, utc));
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(d.and_hms_opt(0, 0, 0)?, utc));
        }
    }

    None
}

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a date in a named IANA timezone, falling back to the date's own offset
pub fn format_date_in(date: &DateTime<FixedOffset>, format: &str, timezone: &str) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => format_date(&date.with_timezone(&tz), format),
        Err(_) => {
            if !timezone.is_empty() {
                tracing::debug!("Unknown timezone {:?}, using document offset", timezone);
            }
            format_date(date, format)
        }
    }
}

/// Turn an ISO timestamp into a display string; `None` when it does not parse
pub fn format_iso(iso: &str, format: &str, timezone: &str) -> Option<String> {
    parse_date_string(iso).map(|d| format_date_in(&d, format, timezone))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
