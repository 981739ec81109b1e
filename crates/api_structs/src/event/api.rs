use crate::dtos::CalendarEventDTO;
use serde::{Deserialize, Serialize};
use slotbook_domain::{
    CalendarEntry, CalendarEvent, EditMode, EventStatus, EventVisibility, RecurrenceRule, ID,
};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventResponse {
    pub event: CalendarEventDTO,
}

impl CalendarEventResponse {
    pub fn new(event: CalendarEvent) -> Self {
        Self {
            event: CalendarEventDTO::new(event),
        }
    }

    pub fn from_entry(entry: CalendarEntry) -> Self {
        Self {
            event: CalendarEventDTO::from_entry(entry),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventsResponse {
    pub events: Vec<CalendarEventDTO>,
}

impl CalendarEventsResponse {
    pub fn new(entries: Vec<CalendarEntry>) -> Self {
        Self {
            events: entries.into_iter().map(CalendarEventDTO::from_entry).collect(),
        }
    }
}

/// Window of a range query. Wall clock values are read in `timezone`,
/// values with an explicit offset are taken as is.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeQuery {
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

pub mod create_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
    }

    #[derive(Serialize, Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        pub agenda: Option<String>,
        pub notes: Option<String>,
        pub start_datetime: String,
        pub end_datetime: String,
        pub timezone: Option<String>,
        pub status: EventStatus,
        pub visibility: EventVisibility,
        pub recurrence_rule: Option<RecurrenceRule>,
        pub color: Option<String>,
    }

    pub type APIResponse = CalendarEventResponse;
}

pub mod get_events {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
    }

    pub type QueryParams = TimeRangeQuery;

    pub type APIResponse = CalendarEventsResponse;
}

pub mod get_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
        /// Stored id or generated occurrence id
        pub event_id: String,
    }

    pub type APIResponse = CalendarEventResponse;
}

pub mod get_event_instances {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
        pub event_id: ID,
    }

    pub type QueryParams = TimeRangeQuery;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub event: CalendarEventDTO,
        pub instances: Vec<CalendarEventDTO>,
    }

    impl APIResponse {
        pub fn new(event: CalendarEvent, instances: Vec<CalendarEntry>) -> Self {
            Self {
                event: CalendarEventDTO::new(event),
                instances: instances
                    .into_iter()
                    .map(CalendarEventDTO::from_entry)
                    .collect(),
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct EditModeQuery {
    #[serde(default)]
    pub mode: EditMode,
}

pub mod update_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
        pub event_id: String,
    }

    pub type QueryParams = EditModeQuery;

    /// Every field is optional, only the given ones are changed.
    /// An explicit `null` for `recurrenceRule` removes the rule.
    #[derive(Serialize, Deserialize, Clone, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: Option<String>,
        pub agenda: Option<String>,
        pub notes: Option<String>,
        pub start_datetime: Option<String>,
        pub end_datetime: Option<String>,
        pub timezone: Option<String>,
        pub status: Option<EventStatus>,
        pub visibility: Option<EventVisibility>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_some"
        )]
        pub recurrence_rule: Option<Option<RecurrenceRule>>,
        pub color: Option<String>,
    }

    /// Tells an absent field apart from an explicit `null`
    fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: serde::Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer).map(Some)
    }

    pub type APIResponse = CalendarEventResponse;
}

pub mod delete_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
        pub event_id: String,
    }

    pub type QueryParams = EditModeQuery;

    /// The removed record, or the occurrence that is no longer generated
    pub type APIResponse = CalendarEventResponse;
}

pub mod convert_open_slot {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub owner_id: ID,
        pub event_id: ID,
    }

    pub type APIResponse = CalendarEventResponse;
}
