use slotbook_domain::{CalendarEntry, CalendarEvent, EventInstance, EventRef, TimeSpan, ID};
use slotbook_infra::SlotbookContext;

/// An addressed event after looking it up in the store
#[derive(Debug, Clone)]
pub enum ResolvedEvent {
    Stored(CalendarEvent),
    /// A generated occurrence together with the master generating it
    Occurrence {
        master: CalendarEvent,
        instance: EventInstance,
    },
}

impl ResolvedEvent {
    pub fn owner_id(&self) -> &ID {
        match self {
            Self::Stored(e) => &e.owner_id,
            Self::Occurrence { master, .. } => &master.owner_id,
        }
    }

    pub fn into_entry(self) -> CalendarEntry {
        match self {
            Self::Stored(e) => CalendarEntry::Stored(e),
            Self::Occurrence { instance, .. } => CalendarEntry::Virtual(instance),
        }
    }
}

/// Looks up a stored event or a generated occurrence. An occurrence is only
/// found while its master still generates it, so excluded and detached
/// positions are gone.
pub async fn find_event(event_ref: &EventRef, ctx: &SlotbookContext) -> Option<ResolvedEvent> {
    match event_ref {
        EventRef::Stored(event_id) => {
            ctx.repos.events.find(event_id).await.map(ResolvedEvent::Stored)
        }
        EventRef::Occurrence(occurrence) => {
            let master = ctx.repos.events.find(&occurrence.master_id).await?;
            if !master.has_occurrence_at(occurrence.start_ts) {
                return None;
            }
            let instance = EventInstance::from_master(&master, occurrence.start_ts);
            Some(ResolvedEvent::Occurrence { master, instance })
        }
    }
}

/// Same as `find_event` but only finds events of the given owner
pub async fn find_owned_event(
    owner_id: &ID,
    event_ref: &EventRef,
    ctx: &SlotbookContext,
) -> Option<ResolvedEvent> {
    match find_event(event_ref, ctx).await {
        Some(resolved) if resolved.owner_id() == owner_id => Some(resolved),
        _ => None,
    }
}

/// The master a series operation applies to: the parent of a detached
/// instance, otherwise the event itself
pub async fn find_series_master(
    resolved: ResolvedEvent,
    ctx: &SlotbookContext,
) -> Option<CalendarEvent> {
    match resolved {
        ResolvedEvent::Occurrence { master, .. } => Some(master),
        ResolvedEvent::Stored(e) => match &e.recurrence_parent_id {
            Some(parent_id) => ctx.repos.events.find(parent_id).await,
            None => Some(e),
        },
    }
}

/// Replaces every master with its occurrences in `timespan` while other
/// events pass through. The result is ordered by start.
pub fn to_calendar_entries(events: Vec<CalendarEvent>, timespan: &TimeSpan) -> Vec<CalendarEntry> {
    let mut entries = Vec::with_capacity(events.len());
    for event in events {
        if event.is_master() {
            entries.extend(event.expand(timespan).into_iter().map(CalendarEntry::Virtual));
        } else {
            entries.push(CalendarEntry::Stored(event));
        }
    }
    entries.sort_by_key(|entry| entry.start_ts());
    entries
}
