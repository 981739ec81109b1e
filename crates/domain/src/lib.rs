mod booking;
mod contact;
pub mod date;
mod event;
mod event_instance;
mod notification;
mod shared;
mod timespan;

pub use booking::{BookingRequest, BookingStatus};
pub use chrono_tz::Tz;
pub use contact::{is_valid_email, normalize_email, Contact};
pub use date::InvalidTimeFormatError;
pub use event::{
    Actor, CalendarEvent, EditMode, EventStatus, EventVisibility, InvalidStateError,
    UnknownVariantError, MAX_RECURRENCE_ITERATIONS,
};
pub use event_instance::{
    CalendarEntry, EventInstance, EventRef, InvalidOccurrenceIdError, OccurrenceId,
};
pub use notification::{Notification, NotificationKind};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::recurrence::{
    InvalidRecurrenceRuleError, RecurrenceFrequency, RecurrenceRule, WeekDay,
};
pub use timespan::{overlaps, InvalidTimeSpanError, TimeSpan};
