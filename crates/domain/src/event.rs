use crate::{
    date::{local_to_timestamp, timestamp_to_local},
    event_instance::EventInstance,
    shared::{
        entity::{Entity, ID},
        recurrence::RecurrenceRule,
    },
    timespan::TimeSpan,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on how many rule positions a single expansion will walk.
/// Reaching it truncates the expansion instead of failing.
pub const MAX_RECURRENCE_ITERATIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: ID,
    pub owner_id: ID,
    pub title: String,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub start_ts: i64,
    pub end_ts: i64,
    pub timezone: Tz,
    pub status: EventStatus,
    pub visibility: EventVisibility,
    pub recurrence: Option<RecurrenceRule>,
    pub recurrence_parent_id: Option<ID>,
    /// Rule positions of a master that are no longer generated, either because
    /// they were detached into their own record or removed individually
    pub exdates: Vec<i64>,
    pub color: Option<String>,
    pub created: i64,
    pub updated: i64,
}

impl Entity for CalendarEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Cancelled,
    OpenSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventVisibility {
    Private,
    PublicOpen,
}

/// Whether a change addresses one occurrence or the whole series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Single,
    Series,
}

impl Default for EditMode {
    fn default() -> Self {
        Self::Single
    }
}

/// Who is asking for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Owner,
    Booking,
}

#[derive(Error, Debug, PartialEq)]
#[error("Status cannot change from {from:?} to {to:?} by {actor:?}")]
pub struct InvalidStateError {
    pub from: EventStatus,
    pub to: EventStatus,
    pub actor: Actor,
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown value: {0}")]
pub struct UnknownVariantError(pub String);

impl EventStatus {
    /// The single table of allowed status changes. Owners may set any status,
    /// a booking may only turn an open slot into a scheduled event.
    pub fn transition(
        self,
        to: EventStatus,
        actor: Actor,
    ) -> Result<EventStatus, InvalidStateError> {
        match (actor, self, to) {
            (Actor::Owner, _, _) => Ok(to),
            (Actor::Booking, EventStatus::OpenSlot, EventStatus::Scheduled) => Ok(to),
            _ => Err(InvalidStateError {
                from: self,
                to,
                actor,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::OpenSlot => "open_slot",
        }
    }
}

impl FromStr for EventStatus {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "open_slot" => Ok(Self::OpenSlot),
            _ => Err(UnknownVariantError(s.to_string())),
        }
    }
}

impl EventVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicOpen => "public_open",
        }
    }
}

impl FromStr for EventVisibility {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public_open" => Ok(Self::PublicOpen),
            _ => Err(UnknownVariantError(s.to_string())),
        }
    }
}

impl CalendarEvent {
    pub fn duration(&self) -> i64 {
        self.end_ts - self.start_ts
    }

    /// Masters carry an active rule and are never themselves detached
    pub fn is_master(&self) -> bool {
        self.recurrence.is_some() && self.recurrence_parent_id.is_none()
    }

    pub fn is_detached(&self) -> bool {
        self.recurrence_parent_id.is_some()
    }

    pub fn is_bookable(&self) -> bool {
        self.status == EventStatus::OpenSlot && self.visibility == EventVisibility::PublicOpen
    }

    pub fn set_status(
        &mut self,
        status: EventStatus,
        actor: Actor,
    ) -> Result<(), InvalidStateError> {
        self.status = self.status.transition(status, actor)?;
        Ok(())
    }

    /// Generates the occurrences of a master whose start falls inside `span`.
    ///
    /// The walk always starts at the master's own start so that `count` is
    /// spent on positions before the window as well. Rule stepping happens on
    /// local time in the event's timezone and every occurrence keeps the
    /// master's duration. Events without an active rule generate nothing.
    pub fn expand(&self, span: &TimeSpan) -> Vec<EventInstance> {
        let rule = match &self.recurrence {
            Some(rule) if self.recurrence_parent_id.is_none() => rule,
            _ => return Vec::new(),
        };

        let tz = self.timezone;
        let anchor = timestamp_to_local(self.start_ts, &tz).naive_local();
        let end_date_ts = rule.end_date_ts(&tz);

        let mut instances = Vec::new();
        for (consumed, position) in rule
            .positions(anchor)
            .take(MAX_RECURRENCE_ITERATIONS)
            .enumerate()
        {
            if let Some(count) = rule.count {
                if consumed >= count as usize {
                    break;
                }
            }
            let start_ts = local_to_timestamp(&position, &tz);
            if let Some(end_date_ts) = end_date_ts {
                if start_ts > end_date_ts {
                    break;
                }
            }
            if start_ts > span.end() {
                break;
            }
            if start_ts >= span.start() && !self.exdates.contains(&start_ts) {
                instances.push(EventInstance::from_master(self, start_ts));
            }
        }

        instances
    }

    /// Whether the rule currently generates an occurrence starting at `start_ts`
    pub fn has_occurrence_at(&self, start_ts: i64) -> bool {
        !self.expand(&TimeSpan::new(start_ts, start_ts)).is_empty()
    }

    /// Clones one occurrence of this master into a standalone record that keeps
    /// a link back to the master but no longer follows its rule
    pub fn detach_occurrence(&self, start_ts: i64, now: i64) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            agenda: self.agenda.clone(),
            notes: self.notes.clone(),
            start_ts,
            end_ts: start_ts + self.duration(),
            timezone: self.timezone,
            status: self.status,
            visibility: self.visibility,
            recurrence: None,
            recurrence_parent_id: Some(self.id.clone()),
            exdates: Vec::new(),
            color: self.color.clone(),
            created: now,
            updated: now,
        }
    }

    /// Carries the exdates along after the master's start or timezone changed.
    ///
    /// Each exdate is moved by the same wall clock delta as the start so it
    /// keeps suppressing the rule position it was recorded for.
    pub fn shift_exdates(&mut self, previous_start_ts: i64, previous_tz: &Tz) {
        if previous_start_ts == self.start_ts && previous_tz == &self.timezone {
            return;
        }
        let previous_anchor = timestamp_to_local(previous_start_ts, previous_tz).naive_local();
        let anchor = timestamp_to_local(self.start_ts, &self.timezone).naive_local();
        let delta = anchor - previous_anchor;

        let tz = self.timezone;
        for exdate in self.exdates.iter_mut() {
            let position = timestamp_to_local(*exdate, previous_tz).naive_local() + delta;
            *exdate = local_to_timestamp(&position, &tz);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        date::parse_datetime,
        shared::recurrence::{RecurrenceFrequency, WeekDay},
    };
    use chrono::{Timelike, Weekday};
    use chrono_tz::{America::New_York, Asia::Manila};

    fn ts(input: &str, tz: &Tz) -> i64 {
        parse_datetime(input, tz).unwrap()
    }

    fn event(start: &str, end: &str, tz: Tz, recurrence: Option<RecurrenceRule>) -> CalendarEvent {
        CalendarEvent {
            id: Default::default(),
            owner_id: Default::default(),
            title: "Standup".into(),
            agenda: None,
            notes: None,
            start_ts: ts(start, &tz),
            end_ts: ts(end, &tz),
            timezone: tz,
            status: EventStatus::Scheduled,
            visibility: EventVisibility::Private,
            recurrence,
            recurrence_parent_id: None,
            exdates: Vec::new(),
            color: None,
            created: 0,
            updated: 0,
        }
    }

    fn span(start: &str, end: &str, tz: &Tz) -> TimeSpan {
        TimeSpan::new(ts(start, tz), ts(end, tz))
    }

    fn daily(count: Option<u32>) -> RecurrenceRule {
        RecurrenceRule {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn weekly_by_day_in_manila() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            interval: 1,
            by_day: Some(vec![WeekDay::new(Weekday::Mon), WeekDay::new(Weekday::Wed)]),
            ..Default::default()
        };
        // 2024-01-01 is a Monday
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(rule));
        let instances = master.expand(&span("2024-01-01T00:00", "2024-01-14T23:59", &Manila));

        let starts = instances.iter().map(|i| i.start_ts).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![
                ts("2024-01-01T09:00", &Manila),
                ts("2024-01-03T09:00", &Manila),
                ts("2024-01-08T09:00", &Manila),
                ts("2024-01-10T09:00", &Manila),
            ]
        );
        for instance in &instances {
            let local_end = timestamp_to_local(instance.end_ts, &Manila);
            assert_eq!(local_end.hour(), 10);
            assert_eq!(instance.parent_id, master.id);
        }
    }

    #[test]
    fn monthly_on_the_31st_skips_february() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Monthly,
            by_month_day: Some(vec![31]),
            ..Default::default()
        };
        let master = event("2024-01-31T10:00", "2024-01-31T11:00", Manila, Some(rule));

        let instances = master.expand(&span("2024-01-01T00:00", "2024-05-01T00:00", &Manila));
        let starts = instances.iter().map(|i| i.start_ts).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![ts("2024-01-31T10:00", &Manila), ts("2024-03-31T10:00", &Manila)]
        );

        let february = master.expand(&span("2024-02-01T00:00", "2024-02-29T23:59", &Manila));
        assert!(february.is_empty());
    }

    #[test]
    fn duration_is_preserved_for_every_frequency() {
        let rules = vec![
            RecurrenceRule::default(),
            RecurrenceRule {
                frequency: RecurrenceFrequency::Daily,
                interval: 3,
                ..Default::default()
            },
            RecurrenceRule {
                frequency: RecurrenceFrequency::Weekly,
                interval: 2,
                ..Default::default()
            },
            RecurrenceRule {
                frequency: RecurrenceFrequency::Weekly,
                by_day: Some(vec![WeekDay::new(Weekday::Tue), WeekDay::new(Weekday::Sat)]),
                ..Default::default()
            },
            RecurrenceRule {
                frequency: RecurrenceFrequency::Monthly,
                ..Default::default()
            },
            RecurrenceRule {
                frequency: RecurrenceFrequency::Monthly,
                by_month_day: Some(vec![5, 20]),
                ..Default::default()
            },
        ];
        for rule in rules {
            // Crosses the DST change in New York on 2024-03-10
            let master = event("2024-03-01T09:00", "2024-03-01T10:30", New_York, Some(rule));
            let instances =
                master.expand(&span("2024-03-01T00:00", "2024-06-30T00:00", &New_York));
            assert!(!instances.is_empty());
            for instance in instances {
                assert_eq!(instance.end_ts - instance.start_ts, master.duration());
                // Stepping happens in local time so wall clock stays put across DST
                assert_eq!(timestamp_to_local(instance.start_ts, &New_York).hour(), 9);
            }
        }
    }

    #[test]
    fn occurrences_stay_inside_the_window() {
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(None)));
        let window = span("2024-01-10T09:30", "2024-01-20T09:00", &Manila);
        let instances = master.expand(&window);

        assert_eq!(instances.len(), 10);
        assert_eq!(instances[0].start_ts, ts("2024-01-11T09:00", &Manila));
        for instance in instances {
            assert!(window.start() <= instance.start_ts && instance.start_ts <= window.end());
        }
    }

    #[test]
    fn count_is_a_lifetime_cap_across_windows() {
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(Some(5))));

        let first = master.expand(&span("2024-01-01T00:00", "2024-01-02T23:59", &Manila));
        let second = master.expand(&span("2024-01-03T00:00", "2024-01-10T23:59", &Manila));
        let third = master.expand(&span("2024-01-06T00:00", "2024-02-10T23:59", &Manila));
        let overlapping = master.expand(&span("2024-01-02T00:00", "2024-01-31T23:59", &Manila));

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);
        assert!(third.is_empty());
        assert_eq!(overlapping.len(), 4);
    }

    #[test]
    fn end_date_is_inclusive() {
        let mut rule = daily(None);
        rule.end_date = Some("2024-01-05T09:00".into());
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(rule.clone()));
        let window = span("2024-01-01T00:00", "2024-01-31T00:00", &Manila);

        let instances = master.expand(&window);
        assert_eq!(instances.len(), 5);
        assert_eq!(
            instances.last().map(|i| i.start_ts),
            Some(ts("2024-01-05T09:00", &Manila))
        );

        rule.end_date = Some("2024-01-04T09:00".into());
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(rule));
        assert_eq!(master.expand(&window).len(), 4);
    }

    #[test]
    fn expansion_is_idempotent() {
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(Some(20))));
        let window = span("2024-01-05T00:00", "2024-01-15T00:00", &Manila);
        assert_eq!(master.expand(&window), master.expand(&window));
    }

    #[test]
    fn unbounded_rules_are_truncated_at_the_ceiling() {
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(None)));
        let instances = master.expand(&span("2024-01-01T00:00", "2034-01-01T00:00", &Manila));
        assert_eq!(instances.len(), MAX_RECURRENCE_ITERATIONS);
    }

    #[test]
    fn exdates_are_skipped_but_still_spend_count() {
        let mut master =
            event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(Some(3))));
        master.exdates.push(ts("2024-01-02T09:00", &Manila));

        let instances = master.expand(&span("2024-01-01T00:00", "2024-01-31T00:00", &Manila));
        let starts = instances.iter().map(|i| i.start_ts).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![ts("2024-01-01T09:00", &Manila), ts("2024-01-03T09:00", &Manila)]
        );
        assert!(!master.has_occurrence_at(ts("2024-01-02T09:00", &Manila)));
        assert!(master.has_occurrence_at(ts("2024-01-03T09:00", &Manila)));
        assert!(!master.has_occurrence_at(ts("2024-01-03T09:30", &Manila)));
    }

    #[test]
    fn non_masters_do_not_expand() {
        let standalone = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, None);
        let window = span("2024-01-01T00:00", "2024-01-31T00:00", &Manila);
        assert!(standalone.expand(&window).is_empty());

        let mut detached = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(None)));
        detached.recurrence_parent_id = Some(ID::new());
        assert!(detached.expand(&window).is_empty());
    }

    #[test]
    fn detached_occurrence_keeps_lineage_but_not_the_rule() {
        let master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(None)));
        let start = ts("2024-01-04T09:00", &Manila);
        let detached = master.detach_occurrence(start, 7);

        assert_ne!(detached.id, master.id);
        assert_eq!(detached.recurrence_parent_id, Some(master.id.clone()));
        assert!(detached.recurrence.is_none());
        assert_eq!(detached.start_ts, start);
        assert_eq!(detached.duration(), master.duration());
        assert_eq!(detached.created, 7);
    }

    #[test]
    fn exdates_follow_a_moved_start() {
        let mut master = event("2024-01-01T09:00", "2024-01-01T10:00", Manila, Some(daily(None)));
        master.exdates = vec![ts("2024-01-03T09:00", &Manila), ts("2024-01-04T09:00", &Manila)];
        let (previous_start, previous_tz) = (master.start_ts, master.timezone);

        master.start_ts = ts("2024-01-01T10:00", &Manila);
        master.end_ts = ts("2024-01-01T11:00", &Manila);
        master.shift_exdates(previous_start, &previous_tz);

        assert_eq!(
            master.exdates,
            vec![ts("2024-01-03T10:00", &Manila), ts("2024-01-04T10:00", &Manila)]
        );
        let window = span("2024-01-03T00:00", "2024-01-04T23:59", &Manila);
        assert!(master.expand(&window).is_empty());

        // Same wall clock in a new zone
        let (previous_start, previous_tz) = (master.start_ts, master.timezone);
        master.timezone = New_York;
        master.start_ts = ts("2024-01-01T10:00", &New_York);
        master.end_ts = ts("2024-01-01T11:00", &New_York);
        master.shift_exdates(previous_start, &previous_tz);
        assert_eq!(master.exdates[0], ts("2024-01-03T10:00", &New_York));
        let window = span("2024-01-03T00:00", "2024-01-04T23:59", &New_York);
        assert!(master.expand(&window).is_empty());
    }

    #[test]
    fn status_transitions() {
        use EventStatus::*;

        assert_eq!(OpenSlot.transition(Scheduled, Actor::Booking), Ok(Scheduled));
        assert!(Scheduled.transition(Scheduled, Actor::Booking).is_err());
        assert!(Cancelled.transition(Scheduled, Actor::Booking).is_err());
        assert!(OpenSlot.transition(Cancelled, Actor::Booking).is_err());
        assert!(Scheduled.transition(OpenSlot, Actor::Booking).is_err());

        for from in [Scheduled, Completed, Cancelled, OpenSlot] {
            for to in [Scheduled, Completed, Cancelled, OpenSlot] {
                assert_eq!(from.transition(to, Actor::Owner), Ok(to));
            }
        }
    }

    #[test]
    fn status_and_visibility_parse_from_storage_form() {
        for status in [
            EventStatus::Scheduled,
            EventStatus::Completed,
            EventStatus::Cancelled,
            EventStatus::OpenSlot,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>(), Ok(status));
        }
        assert_eq!(
            "public_open".parse::<EventVisibility>(),
            Ok(EventVisibility::PublicOpen)
        );
        assert!("booked".parse::<EventStatus>().is_err());
    }
}
