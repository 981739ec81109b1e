use slotbook_domain::{
    date::format_datetime, CalendarEntry, CalendarEvent, EventInstance, EventStatus,
    EventVisibility, RecurrenceRule, Tz, ID,
};
use serde::{Deserialize, Serialize};

/// Shape shared by stored events and generated occurrences.
/// `startDatetime` and `endDatetime` are rendered in the event's own timezone.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventDTO {
    /// Stored id, or `{masterId}_{startTs}` for a generated occurrence
    pub id: String,
    pub owner_id: ID,
    pub title: String,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub start_datetime: String,
    pub end_datetime: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub timezone: Tz,
    pub status: EventStatus,
    pub visibility: EventVisibility,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub recurrence_parent_id: Option<ID>,
    pub exdates: Vec<i64>,
    pub color: Option<String>,
    pub is_virtual: bool,
    pub created: Option<i64>,
    pub updated: Option<i64>,
}

impl CalendarEventDTO {
    pub fn new(event: CalendarEvent) -> Self {
        Self {
            id: event.id.to_string(),
            owner_id: event.owner_id,
            title: event.title,
            agenda: event.agenda,
            notes: event.notes,
            start_datetime: format_datetime(event.start_ts, &event.timezone),
            end_datetime: format_datetime(event.end_ts, &event.timezone),
            start_ts: event.start_ts,
            end_ts: event.end_ts,
            timezone: event.timezone,
            status: event.status,
            visibility: event.visibility,
            recurrence_rule: event.recurrence,
            recurrence_parent_id: event.recurrence_parent_id,
            exdates: event.exdates,
            color: event.color,
            is_virtual: false,
            created: Some(event.created),
            updated: Some(event.updated),
        }
    }

    pub fn from_instance(instance: EventInstance) -> Self {
        Self {
            id: instance.id.to_string(),
            owner_id: instance.owner_id,
            title: instance.title,
            agenda: instance.agenda,
            notes: instance.notes,
            start_datetime: format_datetime(instance.start_ts, &instance.timezone),
            end_datetime: format_datetime(instance.end_ts, &instance.timezone),
            start_ts: instance.start_ts,
            end_ts: instance.end_ts,
            timezone: instance.timezone,
            status: instance.status,
            visibility: instance.visibility,
            recurrence_rule: None,
            recurrence_parent_id: Some(instance.parent_id),
            exdates: Vec::new(),
            color: instance.color,
            is_virtual: true,
            created: None,
            updated: None,
        }
    }

    pub fn from_entry(entry: CalendarEntry) -> Self {
        match entry {
            CalendarEntry::Stored(event) => Self::new(event),
            CalendarEntry::Virtual(instance) => Self::from_instance(instance),
        }
    }
}
