use serde::{Deserialize, Serialize};
use slotbook_domain::{BookingRequest, BookingStatus, ID};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestDTO {
    pub id: ID,
    pub event_id: ID,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub timezone_at_booking: Option<String>,
    pub status: BookingStatus,
    pub created: i64,
}

impl BookingRequestDTO {
    pub fn new(booking: BookingRequest) -> Self {
        Self {
            id: booking.id,
            event_id: booking.event_id,
            name: booking.name,
            email: booking.email,
            message: booking.message,
            timezone_at_booking: booking.timezone_at_booking,
            status: booking.status,
            created: booking.created,
        }
    }
}
