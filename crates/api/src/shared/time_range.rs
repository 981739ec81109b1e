use slotbook_domain::{
    date::{parse_datetime, parse_timezone},
    InvalidTimeFormatError, TimeSpan, Tz,
};
use slotbook_infra::SlotbookContext;

#[derive(Debug)]
pub enum TimeRangeError {
    InvalidTimeFormat(InvalidTimeFormatError),
    /// Start was after end
    InvalidRange(i64, i64),
    /// The range exceeds the configured query limit
    TooLong,
}

/// The given zone, or the configured default when none is given
pub fn resolve_timezone(
    timezone: Option<&str>,
    ctx: &SlotbookContext,
) -> Result<Tz, InvalidTimeFormatError> {
    match timezone {
        Some(timezone) => parse_timezone(timezone),
        None => Ok(ctx.config.default_timezone),
    }
}

/// Reads the window of a range query. Wall clock bounds are interpreted in
/// `timezone`, bounds with an explicit offset are absolute.
pub fn parse_time_range(
    start: &str,
    end: &str,
    timezone: Option<&str>,
    ctx: &SlotbookContext,
) -> Result<TimeSpan, TimeRangeError> {
    let tz = resolve_timezone(timezone, ctx).map_err(TimeRangeError::InvalidTimeFormat)?;
    let start_ts = parse_datetime(start, &tz).map_err(TimeRangeError::InvalidTimeFormat)?;
    let end_ts = parse_datetime(end, &tz).map_err(TimeRangeError::InvalidTimeFormat)?;

    let timespan = TimeSpan::create(start_ts, end_ts)
        .map_err(|e| TimeRangeError::InvalidRange(e.0, e.1))?;
    if timespan.greater_than(ctx.config.event_query_duration_limit) {
        return Err(TimeRangeError::TooLong);
    }
    Ok(timespan)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wall_clock_bounds_use_the_default_timezone() {
        let ctx = SlotbookContext::create_inmemory();
        let span = parse_time_range("2024-01-01", "2024-01-08", None, &ctx).unwrap();
        let expected = parse_datetime("2024-01-01T00:00", &ctx.config.default_timezone).unwrap();
        assert_eq!(span.start(), expected);
        assert_eq!(span.duration(), 7 * 24 * 60 * 60 * 1000);
    }

    #[test]
    fn rejects_bad_ranges() {
        let ctx = SlotbookContext::create_inmemory();
        assert!(matches!(
            parse_time_range("2024-01-08", "2024-01-01", None, &ctx),
            Err(TimeRangeError::InvalidRange(_, _))
        ));
        assert!(matches!(
            parse_time_range("yesterday", "2024-01-01", None, &ctx),
            Err(TimeRangeError::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            parse_time_range("2024-01-01", "2024-01-02", Some("Mars/Olympus"), &ctx),
            Err(TimeRangeError::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            parse_time_range("2024-01-01", "2024-12-31", None, &ctx),
            Err(TimeRangeError::TooLong)
        ));
    }
}
