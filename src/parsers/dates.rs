use chrono::{NaiveDate, NaiveDateTime, Weekday};

/// Fixed format used for `dateStr` in exported JSON, e.g. `August 04, 2022 10:15:00`
pub const DATE_STR_FORMAT: &str = "%B %d, %Y %H:%M:%S";

/// Date-time layouts seen in Kindle declarations and in our own exports, tried in order
const DATE_TIME_FORMATS: &[&str] = &[
    // January 1, 2020 10:00:00 AM
    "%B %d, %Y %I:%M:%S %p",
    // August 04, 2022 10:15:00 (our dateStr)
    DATE_STR_FORMAT,
    // 1 January 2020 10:00:00
    "%d %B %Y %H:%M:%S",
    // 1 January 2020 10:00:00 PM
    "%d %B %Y %I:%M:%S %p",
    // January 1, 2020 10:00 AM
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only layouts; the time defaults to midnight
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%d %B %Y", "%Y-%m-%d"];

/// Permissively parse a human-readable Kindle timestamp.
///
/// Accepts an optional leading weekday (`Monday, `), US and European day/month order,
/// 12 or 24 hour clocks, and ISO dates. Returns `None` when no layout matches.
pub fn parse_kindle_date(raw: &str) -> Option<NaiveDateTime> {
    let normalized = normalize(raw);
    let text = strip_weekday(&normalized);

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(text, format).ok().and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
}

/// Render a timestamp in [`DATE_STR_FORMAT`]
pub fn format_date_str(date: &NaiveDateTime) -> String {
    date.format(DATE_STR_FORMAT).to_string()
}

/// Collapse runs of whitespace and trim
fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a leading `Weekday,` (or `Weekday `) token; chrono would otherwise insist it
/// agrees with the date
fn strip_weekday(text: &str) -> &str {
    let Some((first, rest)) = text.split_once(' ') else {
        return text;
    };
    let candidate = first.trim_end_matches(',');
    if candidate.parse::<Weekday>().is_ok() { rest.trim_start() } else { text }
}
