mod base;
mod booking;
mod event;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use booking::BookingClient;
pub use booking::{CreateBookingInput, GetPublicScheduleInput};
use event::CalendarEventClient;
pub use event::{
    CreateEventInput, DeleteEventInput, GetEventInput, GetEventsInput, GetEventsInstancesInput,
    ScheduleOpenSlotInput, UpdateEventInput,
};
use status::StatusClient;
use std::sync::Arc;

pub use slotbook_api_structs::create_event::RequestBody as CreateEventBody;
pub use slotbook_api_structs::dtos::*;
pub use slotbook_api_structs::update_event::RequestBody as UpdateEventBody;
pub use slotbook_domain::{
    EditMode, EventStatus, EventVisibility, RecurrenceFrequency, RecurrenceRule, Tz, WeekDay, ID,
};

// Domain
pub use slotbook_api_structs::dtos::BookingRequestDTO as BookingRequest;
pub use slotbook_api_structs::dtos::CalendarEventDTO as CalendarEvent;

/// Slotbook Server SDK
///
/// The SDK contains methods for interacting with the Slotbook server
/// API.
#[derive(Clone)]
pub struct SlotbookSDK {
    pub booking: BookingClient,
    pub event: CalendarEventClient,
    pub status: StatusClient,
}

impl SlotbookSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let booking = BookingClient::new(base.clone());
        let event = CalendarEventClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            booking,
            event,
            status,
        }
    }
}
