use chrono::{prelude::*, Duration, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeFormatError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Malformed datetime: {0}")]
    Malformed(String),
    #[error("The local time: {0} does not exist in timezone: {1}")]
    NonexistentLocalTime(String, String),
}

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

pub fn parse_timezone(name: &str) -> Result<Tz, InvalidTimeFormatError> {
    name.parse::<Tz>()
        .map_err(|_| InvalidTimeFormatError::UnknownTimezone(name.to_string()))
}

fn parse_with_offset(input: &str) -> Option<i64> {
    let normalized = match input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => input.to_string(),
    };
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.timestamp_millis())
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Converts a wall-clock string into an absolute timestamp in millis.
///
/// Strings carrying an explicit offset (or `Z`) are absolute and the given
/// timezone is ignored. Everything else is read as local time in `tz`.
/// Local times that fall into a DST gap are rejected and ambiguous ones
/// resolve to the earliest instant.
pub fn parse_datetime(input: &str, tz: &Tz) -> Result<i64, InvalidTimeFormatError> {
    let input = input.trim();
    if let Some(ts) = parse_with_offset(input) {
        return Ok(ts);
    }

    let naive =
        parse_naive(input).ok_or_else(|| InvalidTimeFormatError::Malformed(input.to_string()))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
        LocalResult::Ambiguous(first, second) => Ok(first.min(second).timestamp_millis()),
        LocalResult::None => Err(InvalidTimeFormatError::NonexistentLocalTime(
            input.to_string(),
            tz.name().to_string(),
        )),
    }
}

pub fn timestamp_to_local(ts: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Renders the timestamp as RFC 3339 with the local offset of `tz`
pub fn format_datetime(ts: i64, tz: &Tz) -> String {
    timestamp_to_local(ts, tz).to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Lenient local -> absolute conversion used when stepping through recurrences.
/// Never fails: gaps are skipped forward and overlaps pick the earliest instant.
pub fn local_to_timestamp(naive: &NaiveDateTime, tz: &Tz) -> i64 {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(first, second) => first.min(second).timestamp_millis(),
        LocalResult::None => {
            let shifted = *naive + Duration::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) => dt.timestamp_millis(),
                LocalResult::Ambiguous(first, second) => first.min(second).timestamp_millis(),
                LocalResult::None => Utc.from_utc_datetime(naive).timestamp_millis(),
            }
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month - 1 {
        0 => 31,
        1 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        2 => 31,
        3 => 30,
        4 => 31,
        5 => 30,
        6 => 31,
        7 => 31,
        8 => 30,
        9 => 31,
        10 => 30,
        11 => 31,
        _ => panic!("Invalid month"),
    }
}
