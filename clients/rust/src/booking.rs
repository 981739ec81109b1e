use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use slotbook_api_structs::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct BookingClient {
    base: Arc<BaseClient>,
}

pub type CreateBookingInput = create_booking::RequestBody;

pub struct GetPublicScheduleInput {
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

impl BookingClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get_public_schedule(
        &self,
        input: GetPublicScheduleInput,
    ) -> APIResponse<get_public_schedule::APIResponse> {
        let query = TimeRangeQuery {
            start: input.start,
            end: input.end,
            timezone: input.timezone,
        };
        self.base
            .get_with_query("public/schedule".into(), &query, StatusCode::OK)
            .await
    }

    pub async fn create(
        &self,
        input: CreateBookingInput,
    ) -> APIResponse<create_booking::APIResponse> {
        self.base
            .post(input, "public/bookings".into(), StatusCode::CREATED)
            .await
    }
}
