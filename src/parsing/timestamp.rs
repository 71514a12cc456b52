//! Timestamp decoding for chat log cells.
//!
//! A cell is first read as a regular date string (RFC 3339, RFC 2822 and the
//! common `YYYY-MM-DD HH:MM:SS` shapes). When that fails, three looser
//! encodings are tried in a fixed order, see [`TimestampPattern`].
//!
//! Naive date-times are interpreted in the local time zone, matching how the
//! exports were displayed by the tools that produced them. A trailing `UTC`,
//! `GMT` or `Z` pins them to UTC instead.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static EMBEDDED_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})").expect("valid regex")
});
static EPOCH_MILLIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{13})$").expect("valid regex"));
static EPOCH_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{10})$").expect("valid regex"));

/// Naive layouts accepted by the direct parse, read as local time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Layouts with an explicit offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Zone names that pin a naive layout to UTC.
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "GMT", "Z"];

/// Fallback encodings, tried in declaration order after the direct parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPattern {
    /// `YYYY-MM-DD HH:MM:SS` anywhere in the string, read as local time
    /// Example: `[2020-10-31 12:48:11 UTC+2]`
    EmbeddedDateTime,
    /// Exactly 13 digits: milliseconds since the Unix epoch
    /// Example: `1604148491000`
    EpochMillis,
    /// Exactly 10 digits: seconds since the Unix epoch
    /// Example: `1604148491`
    EpochSeconds,
}

impl TimestampPattern {
    /// Returns all patterns in the order they are tried.
    pub fn all() -> &'static [TimestampPattern] {
        &[
            TimestampPattern::EmbeddedDateTime,
            TimestampPattern::EpochMillis,
            TimestampPattern::EpochSeconds,
        ]
    }

    fn regex(self) -> &'static Regex {
        match self {
            TimestampPattern::EmbeddedDateTime => &EMBEDDED_DATETIME,
            TimestampPattern::EpochMillis => &EPOCH_MILLIS,
            TimestampPattern::EpochSeconds => &EPOCH_SECONDS,
        }
    }

    /// Applies this pattern to `value`.
    ///
    /// Returns `None` when the pattern does not match or the matched text is
    /// not a real instant (e.g. month 13).
    pub fn parse(self, value: &str) -> Option<DateTime<Utc>> {
        let caps = self.regex().captures(value)?;
        let matched = caps.get(1)?.as_str();

        match self {
            TimestampPattern::EmbeddedDateTime => {
                NaiveDateTime::parse_from_str(matched, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .and_then(local_to_utc)
            }
            TimestampPattern::EpochMillis => {
                matched.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
            }
            TimestampPattern::EpochSeconds => matched
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

/// Converts a local wall-clock time to UTC.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times that do
/// not exist locally (DST gap) yield `None`.
pub fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a value the way a general-purpose date constructor would.
pub fn parse_direct(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.to_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.to_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.to_utc());
        }
    }
    if let Some(dt) = parse_utc_suffixed(value) {
        return Some(dt);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            if let Some(dt) = local_to_utc(naive) {
                return Some(dt);
            }
        }
    }
    // Date-only ISO strings are UTC midnight
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads `2020-10-31 12:48:11 UTC` and friends as UTC wall-clock time.
fn parse_utc_suffixed(value: &str) -> Option<DateTime<Utc>> {
    let rest = UTC_SUFFIXES
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))?
        .trim_end();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(rest, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Tries the fallback patterns in order.
pub fn parse_with_patterns(value: &str) -> Option<DateTime<Utc>> {
    TimestampPattern::all()
        .iter()
        .find_map(|pattern| pattern.parse(value))
}

/// Full timestamp resolution: direct parse, then fallback patterns.
///
/// Returns `None` when nothing matches; the caller decides the default.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    parse_direct(value).or_else(|| parse_with_patterns(value))
}
