use super::get_events::handle_time_range_error;
use crate::{
    error::SlotbookError,
    shared::{
        time_range::{parse_time_range, TimeRangeError},
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::get_event_instances::*;
use slotbook_domain::{CalendarEntry, CalendarEvent, ID};
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors, ctx: &SlotbookContext) -> SlotbookError {
    match e {
        UseCaseErrors::InvalidTimeRange(e) => handle_time_range_error(e, ctx),
        UseCaseErrors::NotFound(event_id) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_id
        )),
    }
}

pub async fn get_event_instances_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let query = query_params.0;
    let usecase = GetEventInstancesUseCase {
        owner_id: path_params.owner_id.clone(),
        event_id: path_params.event_id.clone(),
        start: query.start,
        end: query.end,
        timezone: query.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| {
            HttpResponse::Ok().json(APIResponse::new(usecase_res.event, usecase_res.instances))
        })
        .map_err(|e| handle_error(e, &ctx))
}

#[derive(Debug)]
pub struct GetEventInstancesUseCase {
    pub owner_id: ID,
    pub event_id: ID,
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidTimeRange(TimeRangeError),
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub event: CalendarEvent,
    pub instances: Vec<CalendarEntry>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventInstancesUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetEventInstances";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let event = match ctx.repos.events.find(&self.event_id).await {
            Some(event) if event.owner_id == self.owner_id => event,
            _ => return Err(UseCaseErrors::NotFound(self.event_id.clone())),
        };

        let timespan = parse_time_range(&self.start, &self.end, self.timezone.as_deref(), ctx)
            .map_err(UseCaseErrors::InvalidTimeRange)?;

        // Events without a rule only have themselves as instance
        let instances = if event.is_master() {
            event
                .expand(&timespan)
                .into_iter()
                .map(CalendarEntry::Virtual)
                .collect()
        } else if timespan.touches(event.start_ts, event.end_ts) {
            vec![CalendarEntry::Stored(event.clone())]
        } else {
            Vec::new()
        };

        Ok(UseCaseResponse { event, instances })
    }
}
