use crate::dtos::BookingRequestDTO;
use crate::event::api::{CalendarEventsResponse, TimeRangeQuery};
use serde::{Deserialize, Serialize};
use slotbook_domain::BookingRequest;

pub mod get_public_schedule {
    use super::*;

    pub type QueryParams = TimeRangeQuery;

    /// Bookable slots of every owner, generated occurrences included
    pub type APIResponse = CalendarEventsResponse;
}

pub mod create_booking {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// Stored id or generated occurrence id of the slot
        pub calendar_event_id: String,
        pub name: String,
        pub email: String,
        pub message: Option<String>,
        pub timezone: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub booking: BookingRequestDTO,
    }

    impl APIResponse {
        pub fn new(booking: BookingRequest) -> Self {
            Self {
                booking: BookingRequestDTO::new(booking),
            }
        }
    }
}
