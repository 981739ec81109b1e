use crate::{
    error::SlotbookError,
    event::{
        get_events::handle_time_range_error,
        lookup::to_calendar_entries,
    },
    shared::{
        time_range::{parse_time_range, TimeRangeError},
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::get_public_schedule::*;
use slotbook_domain::CalendarEntry;
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors, ctx: &SlotbookContext) -> SlotbookError {
    match e {
        UseCaseErrors::InvalidTimeRange(e) => handle_time_range_error(e, ctx),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn get_public_schedule_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let query = query_params.0;
    let usecase = GetPublicScheduleUseCase {
        start: query.start,
        end: query.end,
        timezone: query.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|entries| HttpResponse::Ok().json(APIResponse::new(entries)))
        .map_err(|e| handle_error(e, &ctx))
}

/// Every slot that can be booked within the window
#[derive(Debug)]
pub struct GetPublicScheduleUseCase {
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidTimeRange(TimeRangeError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetPublicScheduleUseCase {
    type Response = Vec<CalendarEntry>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetPublicSchedule";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let timespan = parse_time_range(&self.start, &self.end, self.timezone.as_deref(), ctx)
            .map_err(UseCaseErrors::InvalidTimeRange)?;

        let events = ctx
            .repos
            .events
            .find_by_timespan(&timespan)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(to_calendar_entries(events, &timespan)
            .into_iter()
            .filter(|entry| entry.is_bookable())
            .collect())
    }
}
