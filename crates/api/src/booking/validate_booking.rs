use crate::event::lookup::ResolvedEvent;
use slotbook_domain::{overlaps, CalendarEvent, EventStatus, EventVisibility, TimeSpan};
use slotbook_infra::SlotbookContext;
use std::fmt::Display;

/// The slot a booking asks for, after resolving the given id
#[derive(Debug, Clone)]
pub enum BookableSlot {
    Stored(CalendarEvent),
    /// An occurrence that only exists through its master. `detached` is the
    /// record it becomes once booked and is not persisted yet.
    Occurrence {
        master: CalendarEvent,
        detached: CalendarEvent,
    },
}

impl BookableSlot {
    pub fn event(&self) -> &CalendarEvent {
        match self {
            Self::Stored(e) => e,
            Self::Occurrence { detached, .. } => detached,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SlotConflict {
    /// Recurring masters are booked per occurrence
    RecurringMaster,
    NotOpen(EventStatus),
    NotPublic,
    Overlaps(String),
}

impl Display for SlotConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecurringMaster => write!(
                f,
                "The event is recurring, book one of its occurrences instead"
            ),
            Self::NotOpen(status) => write!(
                f,
                "The slot is not open for booking, its status is {}",
                status.as_str()
            ),
            Self::NotPublic => write!(f, "The slot is not public"),
            Self::Overlaps(event_id) => write!(
                f,
                "The slot overlaps with another event of the owner: {}",
                event_id
            ),
        }
    }
}

#[derive(Debug)]
pub enum ValidateBookingError {
    Conflict(SlotConflict),
    StorageError,
}

/// Turns a looked up event into the slot to book
pub fn to_bookable_slot(resolved: ResolvedEvent, now: i64) -> Result<BookableSlot, SlotConflict> {
    match resolved {
        ResolvedEvent::Stored(e) if e.is_master() => Err(SlotConflict::RecurringMaster),
        ResolvedEvent::Stored(e) => Ok(BookableSlot::Stored(e)),
        ResolvedEvent::Occurrence { master, instance } => {
            let detached = master.detach_occurrence(instance.start_ts, now);
            Ok(BookableSlot::Occurrence { master, detached })
        }
    }
}

/// Checks that the slot can be booked right now: it must be an open public
/// slot and no private event may overlap it. Private recurring events are
/// checked by their occurrences. Touching at the edges is not an overlap.
pub async fn validate_booking(
    slot: &CalendarEvent,
    ctx: &SlotbookContext,
) -> Result<(), ValidateBookingError> {
    if slot.status != EventStatus::OpenSlot {
        return Err(ValidateBookingError::Conflict(SlotConflict::NotOpen(
            slot.status,
        )));
    }
    if slot.visibility != EventVisibility::PublicOpen {
        return Err(ValidateBookingError::Conflict(SlotConflict::NotPublic));
    }

    let timespan = TimeSpan::new(slot.start_ts, slot.end_ts);
    let candidates = ctx
        .repos
        .events
        .find_by_timespan(&timespan)
        .await
        .map_err(|_| ValidateBookingError::StorageError)?;

    match find_private_overlap(slot, candidates) {
        Some(blocking) => Err(ValidateBookingError::Conflict(SlotConflict::Overlaps(
            blocking,
        ))),
        None => Ok(()),
    }
}

/// Owners do not matter here, every private event blocks
fn find_private_overlap(slot: &CalendarEvent, candidates: Vec<CalendarEvent>) -> Option<String> {
    let is_blocking =
        |start_ts: i64, end_ts: i64| overlaps(slot.start_ts, slot.end_ts, start_ts, end_ts);

    for e in candidates
        .into_iter()
        .filter(|e| e.visibility == EventVisibility::Private && e.id != slot.id)
    {
        if e.is_master() {
            // Occurrences starting up to one duration before the slot can still reach into it
            let window = TimeSpan::new(slot.start_ts - e.duration(), slot.end_ts);
            if let Some(instance) = e
                .expand(&window)
                .into_iter()
                .find(|instance| is_blocking(instance.start_ts, instance.end_ts))
            {
                return Some(instance.id.to_string());
            }
        } else if is_blocking(e.start_ts, e.end_ts) {
            return Some(e.id.to_string());
        }
    }
    None
}
