use crate::{
    event::{CalendarEvent, EventStatus, EventVisibility},
    shared::entity::ID,
};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Identifies one generated occurrence of a master event.
/// Rendered as `{master_id}_{start_ts}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceId {
    pub master_id: ID,
    pub start_ts: i64,
}

impl OccurrenceId {
    pub fn new(master_id: ID, start_ts: i64) -> Self {
        Self {
            master_id,
            start_ts,
        }
    }
}

impl Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.master_id, self.start_ts)
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Occurrence id: {0} is malformed")]
pub struct InvalidOccurrenceIdError(pub String);

impl FromStr for OccurrenceId {
    type Err = InvalidOccurrenceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidOccurrenceIdError(s.to_string());
        let (master_id, start_ts) = s.rsplit_once('_').ok_or_else(malformed)?;
        let master_id = master_id.parse::<ID>().map_err(|_| malformed())?;
        let start_ts = start_ts.parse::<i64>().map_err(|_| malformed())?;
        Ok(Self::new(master_id, start_ts))
    }
}

impl Serialize for OccurrenceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// What a client refers to when addressing an event: either a stored
/// record or a generated occurrence of a master
#[derive(Debug, Clone, PartialEq)]
pub enum EventRef {
    Stored(ID),
    Occurrence(OccurrenceId),
}

impl FromStr for EventRef {
    type Err = InvalidOccurrenceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ID>() {
            Ok(id) => Ok(Self::Stored(id)),
            Err(_) => s.parse::<OccurrenceId>().map(Self::Occurrence),
        }
    }
}

impl Display for EventRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored(id) => write!(f, "{}", id),
            Self::Occurrence(occurrence) => write!(f, "{}", occurrence),
        }
    }
}

/// A generated, never persisted occurrence of a master event
#[derive(Debug, Clone, PartialEq)]
pub struct EventInstance {
    pub id: OccurrenceId,
    pub parent_id: ID,
    pub owner_id: ID,
    pub title: String,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub start_ts: i64,
    pub end_ts: i64,
    pub timezone: Tz,
    pub status: EventStatus,
    pub visibility: EventVisibility,
    pub color: Option<String>,
}

impl EventInstance {
    pub fn from_master(master: &CalendarEvent, start_ts: i64) -> Self {
        Self {
            id: OccurrenceId::new(master.id.clone(), start_ts),
            parent_id: master.id.clone(),
            owner_id: master.owner_id.clone(),
            title: master.title.clone(),
            agenda: master.agenda.clone(),
            notes: master.notes.clone(),
            start_ts,
            end_ts: start_ts + master.duration(),
            timezone: master.timezone,
            status: master.status,
            visibility: master.visibility,
            color: master.color.clone(),
        }
    }
}

/// One row of a calendar listing: stored events pass through as they are
/// while masters are replaced by their generated occurrences
#[derive(Debug, Clone)]
pub enum CalendarEntry {
    Stored(CalendarEvent),
    Virtual(EventInstance),
}

impl CalendarEntry {
    pub fn start_ts(&self) -> i64 {
        match self {
            Self::Stored(e) => e.start_ts,
            Self::Virtual(e) => e.start_ts,
        }
    }

    pub fn end_ts(&self) -> i64 {
        match self {
            Self::Stored(e) => e.end_ts,
            Self::Virtual(e) => e.end_ts,
        }
    }

    pub fn status(&self) -> EventStatus {
        match self {
            Self::Stored(e) => e.status,
            Self::Virtual(e) => e.status,
        }
    }

    pub fn visibility(&self) -> EventVisibility {
        match self {
            Self::Stored(e) => e.visibility,
            Self::Virtual(e) => e.visibility,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }

    pub fn is_bookable(&self) -> bool {
        self.status() == EventStatus::OpenSlot && self.visibility() == EventVisibility::PublicOpen
    }
}
