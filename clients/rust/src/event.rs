use crate::{APIResponse, BaseClient, ID};
use reqwest::StatusCode;
use slotbook_api_structs::*;
use slotbook_domain::EditMode;
use std::sync::Arc;

#[derive(Clone)]
pub struct CalendarEventClient {
    base: Arc<BaseClient>,
}

pub struct CreateEventInput {
    pub owner_id: ID,
    pub body: create_event::RequestBody,
}

pub struct GetEventInput {
    pub owner_id: ID,
    /// Stored id or generated occurrence id
    pub event_id: String,
}

pub struct GetEventsInput {
    pub owner_id: ID,
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

pub struct GetEventsInstancesInput {
    pub owner_id: ID,
    pub event_id: ID,
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

pub struct UpdateEventInput {
    pub owner_id: ID,
    pub event_id: String,
    pub mode: EditMode,
    pub body: update_event::RequestBody,
}

pub struct ScheduleOpenSlotInput {
    pub owner_id: ID,
    pub event_id: ID,
}

pub struct DeleteEventInput {
    pub owner_id: ID,
    pub event_id: String,
    pub mode: EditMode,
}

impl CalendarEventClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateEventInput) -> APIResponse<create_event::APIResponse> {
        self.base
            .post(
                input.body,
                format!("user/{}/events", input.owner_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get(&self, input: GetEventInput) -> APIResponse<get_event::APIResponse> {
        self.base
            .get(
                format!("user/{}/events/{}", input.owner_id, input.event_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn get_events(&self, input: GetEventsInput) -> APIResponse<get_events::APIResponse> {
        let query = TimeRangeQuery {
            start: input.start,
            end: input.end,
            timezone: input.timezone,
        };
        self.base
            .get_with_query(
                format!("user/{}/events", input.owner_id),
                &query,
                StatusCode::OK,
            )
            .await
    }

    pub async fn get_instances(
        &self,
        input: GetEventsInstancesInput,
    ) -> APIResponse<get_event_instances::APIResponse> {
        let query = TimeRangeQuery {
            start: input.start,
            end: input.end,
            timezone: input.timezone,
        };
        self.base
            .get_with_query(
                format!("user/{}/events/{}/instances", input.owner_id, input.event_id),
                &query,
                StatusCode::OK,
            )
            .await
    }

    pub async fn update(&self, input: UpdateEventInput) -> APIResponse<update_event::APIResponse> {
        self.base
            .put(
                input.body,
                format!("user/{}/events/{}", input.owner_id, input.event_id),
                &EditModeQuery { mode: input.mode },
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(&self, input: DeleteEventInput) -> APIResponse<delete_event::APIResponse> {
        self.base
            .delete(
                format!("user/{}/events/{}", input.owner_id, input.event_id),
                &EditModeQuery { mode: input.mode },
                StatusCode::OK,
            )
            .await
    }

    /// Turns a stored open slot into a scheduled event
    pub async fn schedule_open_slot(
        &self,
        input: ScheduleOpenSlotInput,
    ) -> APIResponse<convert_open_slot::APIResponse> {
        self.base
            .post(
                (),
                format!("user/{}/events/{}/schedule", input.owner_id, input.event_id),
                StatusCode::OK,
            )
            .await
    }
}
