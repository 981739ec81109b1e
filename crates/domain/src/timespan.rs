use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed interval `[start_ts, end_ts]` of absolute timestamps in millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpan {
    start_ts: i64,
    end_ts: i64,
}

#[derive(Error, Debug, PartialEq)]
#[error("Provided timespan start_ts: {0} must not be after end_ts: {1}")]
pub struct InvalidTimeSpanError(pub i64, pub i64);

impl TimeSpan {
    pub fn new(start_ts: i64, end_ts: i64) -> Self {
        Self { start_ts, end_ts }
    }

    pub fn create(start_ts: i64, end_ts: i64) -> Result<Self, InvalidTimeSpanError> {
        if start_ts > end_ts {
            Err(InvalidTimeSpanError(start_ts, end_ts))
        } else {
            Ok(Self::new(start_ts, end_ts))
        }
    }

    pub fn start(&self) -> i64 {
        self.start_ts
    }

    pub fn end(&self) -> i64 {
        self.end_ts
    }

    pub fn duration(&self) -> i64 {
        self.end_ts - self.start_ts
    }

    pub fn greater_than(&self, duration: i64) -> bool {
        self.duration() > duration
    }

    /// Inclusive on both ends, which is what range queries against the store use
    pub fn touches(&self, start_ts: i64, end_ts: i64) -> bool {
        self.start_ts <= end_ts && self.end_ts >= start_ts
    }
}

/// Half open overlap check, `[a_start, a_end)` against `[b_start, b_end)`
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && a_end > b_start
}
