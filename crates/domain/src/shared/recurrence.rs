use crate::date::{get_month_length, parse_datetime};
use chrono::{prelude::*, Duration, Months, NaiveDateTime};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How many days ahead a weekly rule with `byDay` looks for the next match
const WEEKLY_SCAN_LIMIT: i64 = 14;
/// How many months ahead a monthly rule with `byMonthDay` looks for the next match
const MONTHLY_SCAN_LIMIT: u32 = 12;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Wall clock cutoff resolved in the timezone of the event, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Maximum number of occurrences over the whole lifetime of the rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_day: Option<Vec<WeekDay>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<Vec<u32>>,
}

fn default_interval() -> u32 {
    1
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: RecurrenceFrequency::Daily,
            interval: default_interval(),
            end_date: None,
            count: None,
            by_day: None,
            by_month_day: None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRecurrenceRuleError {
    #[error("Interval must be a positive integer")]
    InvalidInterval,
    #[error("Count must be a positive integer")]
    InvalidCount,
    #[error("byDay can only be used with a weekly frequency")]
    ByDayRequiresWeekly,
    #[error("byMonthDay can only be used with a monthly frequency")]
    ByMonthDayRequiresMonthly,
    #[error("Invalid day of month: {0}")]
    InvalidMonthDay(u32),
    #[error("Invalid end date: {0}")]
    InvalidEndDate(String),
}

impl RecurrenceRule {
    pub fn validate(&self, tz: &Tz) -> Result<(), InvalidRecurrenceRuleError> {
        if self.interval == 0 {
            return Err(InvalidRecurrenceRuleError::InvalidInterval);
        }
        if self.count == Some(0) {
            return Err(InvalidRecurrenceRuleError::InvalidCount);
        }
        if self.weekdays().is_some() && self.frequency != RecurrenceFrequency::Weekly {
            return Err(InvalidRecurrenceRuleError::ByDayRequiresWeekly);
        }
        if let Some(days) = self.month_days() {
            if self.frequency != RecurrenceFrequency::Monthly {
                return Err(InvalidRecurrenceRuleError::ByMonthDayRequiresMonthly);
            }
            if let Some(day) = days.iter().find(|day| **day < 1 || **day > 31) {
                return Err(InvalidRecurrenceRuleError::InvalidMonthDay(*day));
            }
        }
        if let Some(end_date) = &self.end_date {
            if parse_datetime(end_date, tz).is_err() {
                return Err(InvalidRecurrenceRuleError::InvalidEndDate(
                    end_date.clone(),
                ));
            }
        }
        Ok(())
    }

    /// The inclusive cutoff as an absolute timestamp. A malformed end date
    /// is ignored here so that expansion never fails.
    pub fn end_date_ts(&self, tz: &Tz) -> Option<i64> {
        self.end_date
            .as_ref()
            .and_then(|end_date| parse_datetime(end_date, tz).ok())
    }

    fn weekdays(&self) -> Option<&[WeekDay]> {
        self.by_day
            .as_deref()
            .filter(|days| !days.is_empty())
    }

    fn month_days(&self) -> Option<&[u32]> {
        self.by_month_day
            .as_deref()
            .filter(|days| !days.is_empty())
    }

    /// Lazily walks the local positions of this rule starting with the anchor itself.
    /// The walk is unbounded for rules without `count` or `end_date`, so callers
    /// are expected to cap it.
    pub fn positions(&self, anchor: NaiveDateTime) -> RecurrencePositions<'_> {
        RecurrencePositions {
            rule: self,
            anchor,
            current: Some(anchor),
            step: 0,
        }
    }

    /// Steps from `current` to the next rule position.
    ///
    /// With `byMonthDay` set every listed day of each month is generated, and
    /// `interval` is not applied: the scan moves to the next month holding a
    /// listed day. The same holds for weekly rules with `byDay`, which step
    /// through the listed weekdays of consecutive weeks.
    fn advance(
        &self,
        anchor: &NaiveDateTime,
        current: &NaiveDateTime,
        step: u32,
    ) -> Option<NaiveDateTime> {
        let interval = self.interval.max(1);
        match self.frequency {
            RecurrenceFrequency::Daily => {
                current.checked_add_signed(Duration::days(interval.into()))
            }
            RecurrenceFrequency::Weekly => match self.weekdays() {
                Some(days) => next_weekday(current, days).or_else(|| add_weeks(current, interval)),
                None => add_weeks(current, interval),
            },
            RecurrenceFrequency::Monthly => match self.month_days() {
                Some(days) => next_month_day(current, days)
                    .or_else(|| current.checked_add_months(Months::new(interval))),
                // Stepping from the anchor keeps e.g. the 31st from drifting to
                // the 28th after passing February
                None => step
                    .checked_mul(interval)
                    .and_then(|months| anchor.checked_add_months(Months::new(months))),
            },
        }
    }
}

fn add_weeks(current: &NaiveDateTime, weeks: u32) -> Option<NaiveDateTime> {
    current.checked_add_signed(Duration::weeks(weeks.into()))
}

fn next_weekday(current: &NaiveDateTime, days: &[WeekDay]) -> Option<NaiveDateTime> {
    (1..=WEEKLY_SCAN_LIMIT)
        .filter_map(|offset| current.checked_add_signed(Duration::days(offset)))
        .find(|candidate| days.iter().any(|d| d.weekday() == candidate.weekday()))
}

fn next_month_day(current: &NaiveDateTime, days: &[u32]) -> Option<NaiveDateTime> {
    let time = current.time();
    let (mut year, mut month) = (current.year(), current.month());

    let later_this_month = days
        .iter()
        .filter(|day| **day > current.day() && **day <= get_month_length(year, month))
        .min();
    if let Some(day) = later_this_month {
        return NaiveDate::from_ymd_opt(year, month, *day).map(|date| date.and_time(time));
    }

    for _ in 0..MONTHLY_SCAN_LIMIT {
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
        let month_length = get_month_length(year, month);
        let first_match = days
            .iter()
            .filter(|day| **day >= 1 && **day <= month_length)
            .min();
        if let Some(day) = first_match {
            return NaiveDate::from_ymd_opt(year, month, *day).map(|date| date.and_time(time));
        }
    }
    None
}

pub struct RecurrencePositions<'a> {
    rule: &'a RecurrenceRule,
    anchor: NaiveDateTime,
    current: Option<NaiveDateTime>,
    step: u32,
}

impl<'a> Iterator for RecurrencePositions<'a> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.step = self.step.saturating_add(1);
        self.current = self.rule.advance(&self.anchor, &current, self.step);
        Some(current)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekDay(Weekday);

impl WeekDay {
    pub fn new(weekday: Weekday) -> Self {
        Self(weekday)
    }

    pub fn weekday(&self) -> Weekday {
        self.0
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self.0 {
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
            Weekday::Sun => "SU",
        };
        write!(f, "{}", code)
    }
}

#[derive(Error, Debug)]
pub enum InvalidWeekDayError {
    #[error("Invalid weekday specified: {0}")]
    InvalidWeekdayIdentifier(String),
}

impl FromStr for WeekDay {
    type Err = InvalidWeekDayError;

    fn from_str(day: &str) -> Result<Self, Self::Err> {
        let weekday = match day.to_uppercase().as_str() {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            _ => return Err(InvalidWeekDayError::InvalidWeekdayIdentifier(day.to_string())),
        };
        Ok(Self(weekday))
    }
}

impl Serialize for WeekDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WeekDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct WeekDayVisitor;

        impl<'de> Visitor<'de> for WeekDayVisitor {
            type Value = WeekDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid string representation of weekday")
            }

            fn visit_str<E>(self, value: &str) -> Result<WeekDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<WeekDay>()
                    .map_err(|_| E::custom(format!("Malformed weekday: {}", value)))
            }
        }

        deserializer.deserialize_str(WeekDayVisitor)
    }
}
